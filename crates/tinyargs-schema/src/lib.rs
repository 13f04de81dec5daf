//! JSON declaration format for `tinyargs` parsers.
//!
//! A schema document describes the same things `ArgumentParser::add_argument` takes, so a
//! tool can keep its command-line surface in a data file:
//!
//! ```json
//! {
//!   "prog": "greet",
//!   "arguments": [
//!     { "names": ["-c", "--count"], "type": "int", "default": 1 },
//!     { "names": ["name"] }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tinyargs::{ActionKind, Arg, ArgumentParser, Converter, DefinitionError, Nargs, Value};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("argument #{index}: unknown type '{name}' (expected str, int, float or bool)")]
    UnknownType { index: usize, name: String },

    #[error("argument #{index}: invalid nargs '{value}' (expected ?, *, + or a count)")]
    InvalidNargs { index: usize, value: String },

    #[error("argument #{index}: {source}")]
    Definition {
        index: usize,
        source: DefinitionError,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionName {
    #[default]
    Store,
    StoreConst,
    StoreTrue,
    StoreFalse,
    Append,
}

impl From<ActionName> for ActionKind {
    fn from(name: ActionName) -> Self {
        match name {
            ActionName::Store => Self::Store,
            ActionName::StoreConst => Self::StoreConst,
            ActionName::StoreTrue => Self::StoreTrue,
            ActionName::StoreFalse => Self::StoreFalse,
            ActionName::Append => Self::Append,
        }
    }
}

/// `nargs` as written in JSON: a count or one of `?`, `*`, `+`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NargsSchema {
    Count(usize),
    Symbol(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArgumentSchema {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default)]
    pub action: ActionName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nargs: Option<NargsSchema>,
    #[serde(default, rename = "const", skip_serializing_if = "Option::is_none")]
    pub constant: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metavar: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParserSchema {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prog: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub epilog: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentSchema>,
}

fn converter_for(index: usize, name: Option<&str>) -> Result<Option<Converter>, SchemaError> {
    let converter = match name {
        None => return Ok(None),
        Some("str") => Converter::string(),
        Some("int") => Converter::int(),
        Some("float") => Converter::float(),
        Some("bool") => Converter::boolean(),
        Some(other) => {
            return Err(SchemaError::UnknownType {
                index,
                name: other.to_string(),
            });
        }
    };
    Ok(Some(converter))
}

fn nargs_for(index: usize, nargs: &NargsSchema) -> Result<Nargs, SchemaError> {
    match nargs {
        NargsSchema::Count(n) => Ok(Nargs::Exactly(*n)),
        NargsSchema::Symbol(s) => match s.as_str() {
            "?" => Ok(Nargs::Optional),
            "*" => Ok(Nargs::ZeroOrMore),
            "+" => Ok(Nargs::OneOrMore),
            other => Err(SchemaError::InvalidNargs {
                index,
                value: other.to_string(),
            }),
        },
    }
}

impl ArgumentSchema {
    /// Translate into an `Arg` declaration. `index` only labels errors.
    pub fn to_arg(&self, index: usize) -> Result<Arg, SchemaError> {
        let mut arg = Arg::new(self.names.iter().cloned())
            .action(self.action.into())
            .required(self.required)
            .help(self.help.clone());
        if let Some(dest) = &self.dest {
            arg = arg.dest(dest.clone());
        }
        if let Some(converter) = converter_for(index, self.value_type.as_deref())? {
            arg = arg.converter(converter);
        }
        if let Some(nargs) = &self.nargs {
            arg = arg.nargs(nargs_for(index, nargs)?);
        }
        if let Some(constant) = &self.constant {
            arg = arg.constant(constant.clone());
        }
        if let Some(default) = &self.default {
            arg = arg.default_value(default.clone());
        }
        if let Some(choices) = &self.choices {
            arg = arg.choices(choices.iter().cloned());
        }
        if let Some(metavar) = &self.metavar {
            arg = arg.metavar(metavar.clone());
        }
        Ok(arg)
    }
}

impl ParserSchema {
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let contents = fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Build a parser with every declared argument registered in order.
    pub fn build(&self) -> Result<ArgumentParser, SchemaError> {
        let mut parser = ArgumentParser::new(self.prog.clone())
            .with_description(self.description.clone())
            .with_epilog(self.epilog.clone());
        for (index, schema) in self.arguments.iter().enumerate() {
            let arg = schema.to_arg(index)?;
            parser
                .add_argument(arg)
                .map_err(|source| SchemaError::Definition { index, source })?;
        }
        Ok(parser)
    }

    pub fn to_json_pretty(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
