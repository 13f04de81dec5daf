use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConversionError;

/// A converted argument value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Not set. Required-option checks look for this.
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

type ConvertFn = dyn Fn(&str) -> Result<Value, ConversionError> + Send + Sync;

/// Turns one raw token into a [`Value`].
///
/// The optional type name is what error messages show (`invalid int value: x`).
#[derive(Clone)]
pub struct Converter {
    type_name: Option<Cow<'static, str>>,
    func: Arc<ConvertFn>,
}

impl Converter {
    /// A converter with a type name used in error messages.
    pub fn named<F>(type_name: impl Into<Cow<'static, str>>, func: F) -> Self
    where
        F: Fn(&str) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        Self {
            type_name: Some(type_name.into()),
            func: Arc::new(func),
        }
    }

    /// A converter without a type name; failures name the option key instead.
    pub fn anonymous<F>(func: F) -> Self
    where
        F: Fn(&str) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        Self {
            type_name: None,
            func: Arc::new(func),
        }
    }

    /// Build a converter from any `FromStr` type whose output maps into a `Value`.
    pub fn parse<T>(type_name: impl Into<Cow<'static, str>>) -> Self
    where
        T: FromStr + Into<Value> + 'static,
        T::Err: fmt::Display,
    {
        Self::named(type_name, |raw| {
            raw.trim()
                .parse::<T>()
                .map(Into::into)
                .map_err(|e| ConversionError::new(e.to_string()))
        })
    }

    /// Passes the token through unchanged.
    pub fn string() -> Self {
        Self::named("str", |raw| Ok(Value::Str(raw.to_string())))
    }

    pub fn int() -> Self {
        Self::parse::<i64>("int")
    }

    pub fn float() -> Self {
        Self::parse::<f64>("float")
    }

    /// Accepts `true/false`, `yes/no`, `on/off` and `1/0`, case-insensitively.
    pub fn boolean() -> Self {
        Self::named("bool", |raw| match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
            other => Err(ConversionError::new(format!("not a boolean: {other}"))),
        })
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        (self.func)(raw)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::string()
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
