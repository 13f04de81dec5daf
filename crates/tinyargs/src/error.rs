use thiserror::Error;

/// Exit status used by the process glue for every parse failure.
pub const PARSE_ERROR_EXIT_CODE: i32 = 2;

/// A user-input failure raised while consuming tokens.
///
/// Every variant is recoverable: the parser returns it to the caller, and only the
/// [`crate::exit`] glue turns it into a process exit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    /// An option or positional needed more tokens than were available.
    #[error("expecting value for {key}")]
    MissingValue { key: String },

    /// A token failed type conversion.
    #[error("{}", invalid_value_message(.key, .token, .type_name.as_deref()))]
    InvalidValue {
        key: String,
        token: String,
        type_name: Option<String>,
    },

    /// A token is outside the declared set of choices.
    #[error("value {token} must be one of this '{}'", .choices.join(", "))]
    InvalidChoice { token: String, choices: Vec<String> },

    /// An option-looking token matched no declared spelling.
    #[error("unknown option {0}")]
    UnknownOption(String),

    /// Required named options that were never supplied, by dest.
    #[error("option(s) '{}' is(are) required", .0.join(", "))]
    MissingRequired(Vec<String>),

    /// Tokens left over after the positional run.
    #[error("extra args: {}", .0.join(" "))]
    ExtraArguments(Vec<String>),
}

impl ArgError {
    pub fn exit_code(&self) -> i32 {
        PARSE_ERROR_EXIT_CODE
    }
}

fn invalid_value_message(key: &str, token: &str, type_name: Option<&str>) -> String {
    match type_name {
        Some(name) => format!("invalid {name} value: {token}"),
        None => format!("value {token} is not applicable for type of key {key}"),
    }
}

/// Returned by a converter that cannot turn a raw token into a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ConversionError {
    reason: String,
}

impl ConversionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<std::num::ParseIntError> for ConversionError {
    fn from(e: std::num::ParseIntError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<std::num::ParseFloatError> for ConversionError {
    fn from(e: std::num::ParseFloatError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<std::str::ParseBoolError> for ConversionError {
    fn from(e: std::str::ParseBoolError) -> Self {
        Self::new(e.to_string())
    }
}

/// A malformed argument declaration, rejected by `add_argument`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("argument declares neither a spelling nor a dest")]
    NoNames,

    #[error("positional argument '{}' must have exactly one name", .0.join(", "))]
    PositionalNames(Vec<String>),

    #[error("invalid option spelling '{0}'")]
    InvalidSpelling(String),
}
