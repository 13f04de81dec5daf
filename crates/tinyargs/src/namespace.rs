use indexmap::IndexMap;
use serde::Serialize;

use crate::value::Value;

/// Parsed values keyed by dest.
///
/// Named arguments come first in declaration order, then positionals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Namespace {
    values: IndexMap<String, Value>,
}

impl Namespace {
    pub(crate) fn insert(&mut self, dest: &str, value: Value) {
        self.values.insert(dest.to_string(), value);
    }

    pub fn get(&self, dest: &str) -> Option<&Value> {
        self.values.get(dest)
    }

    pub fn get_str(&self, dest: &str) -> Option<&str> {
        self.get(dest).and_then(Value::as_str)
    }

    pub fn get_int(&self, dest: &str) -> Option<i64> {
        self.get(dest).and_then(Value::as_int)
    }

    pub fn get_float(&self, dest: &str) -> Option<f64> {
        self.get(dest).and_then(Value::as_float)
    }

    pub fn get_bool(&self, dest: &str) -> Option<bool> {
        self.get(dest).and_then(Value::as_bool)
    }

    pub fn get_list(&self, dest: &str) -> Option<&[Value]> {
        self.get(dest).and_then(Value::as_list)
    }

    pub fn contains(&self, dest: &str) -> bool {
        self.values.contains_key(dest)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.values
    }
}

impl std::ops::Index<&str> for Namespace {
    type Output = Value;

    /// # Panics
    ///
    /// Panics if no argument was declared with `dest`.
    fn index(&self, dest: &str) -> &Value {
        match self.values.get(dest) {
            Some(v) => v,
            None => panic!("no argument with dest '{dest}'"),
        }
    }
}
