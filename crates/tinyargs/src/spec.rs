//! Argument declarations and per-argument value extraction.

use std::fmt;

use crate::error::{ArgError, DefinitionError};
use crate::tokens::{Tokens, looks_like_option};
use crate::value::{Converter, Value};

/// How many tokens one occurrence of an argument consumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Nargs {
    /// Exactly one token, stored as a scalar.
    #[default]
    Single,
    /// `?`: one token if any remain, else the default.
    Optional,
    /// `N`: exactly N tokens, stored as a list.
    Exactly(usize),
    /// `*`: any number of tokens, stored as a list.
    ZeroOrMore,
    /// `+`: at least one token, stored as a list.
    OneOrMore,
}

impl fmt::Display for Nargs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => f.write_str("1"),
            Self::Optional => f.write_str("?"),
            Self::Exactly(n) => write!(f, "{n}"),
            Self::ZeroOrMore => f.write_str("*"),
            Self::OneOrMore => f.write_str("+"),
        }
    }
}

/// What a declaration asks for. `StoreTrue`/`StoreFalse` are sugar resolved at registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActionKind {
    #[default]
    Store,
    StoreConst,
    StoreTrue,
    StoreFalse,
    Append,
}

/// The resolved action of a registered argument.
#[derive(Debug, Clone)]
pub enum Action {
    /// Replace the destination with the consumed value.
    Store { nargs: Nargs, converter: Converter },
    /// Push the consumed value onto a list at the destination.
    Append { nargs: Nargs, converter: Converter },
    /// Assign a fixed value without consuming tokens.
    StoreConst(Value),
}

/// Declarative options for one argument, handed to `ArgumentParser::add_argument`.
///
/// ```
/// use tinyargs::{Arg, Converter};
///
/// let count = Arg::new(["-c", "--count"]).converter(Converter::int()).default_value(0);
/// let name = Arg::positional("name").help("who to greet");
/// # let _ = (count, name);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Arg {
    pub(crate) names: Vec<String>,
    pub(crate) dest: Option<String>,
    pub(crate) converter: Option<Converter>,
    pub(crate) action: ActionKind,
    pub(crate) nargs: Option<Nargs>,
    pub(crate) constant: Option<Value>,
    pub(crate) default: Option<Value>,
    pub(crate) required: bool,
    pub(crate) choices: Option<Vec<String>>,
    pub(crate) help: String,
    pub(crate) metavar: Option<String>,
}

impl Arg {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn positional(name: impl Into<String>) -> Self {
        Self::new([name])
    }

    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    pub fn converter(mut self, converter: Converter) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn action(mut self, action: ActionKind) -> Self {
        self.action = action;
        self
    }

    pub fn nargs(mut self, nargs: Nargs) -> Self {
        self.nargs = Some(nargs);
        self
    }

    pub fn constant(mut self, value: impl Into<Value>) -> Self {
        self.constant = Some(value.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar = Some(metavar.into());
        self
    }
}

/// Derive a dest from option spellings: the last `--long` spelling wins, else the first.
pub fn dest_from_spellings(names: &[String]) -> String {
    let chosen = names
        .iter()
        .rev()
        .find(|n| n.starts_with("--"))
        .or_else(|| names.first())
        .map(String::as_str)
        .unwrap_or_default();
    chosen.trim_start_matches('-').replace('-', "_")
}

/// An immutable, registered argument.
#[derive(Debug, Clone)]
pub struct ArgumentSpec {
    names: Vec<String>,
    dest: String,
    action: Action,
    default: Value,
    required: bool,
    choices: Option<Vec<String>>,
    help: String,
    metavar: Option<String>,
}

impl ArgumentSpec {
    /// Resolve a declaration into a spec. Returns the spec and whether it is named.
    pub(crate) fn from_arg(arg: Arg) -> Result<(Self, bool), DefinitionError> {
        let (action, default) = match arg.action {
            ActionKind::StoreTrue => (
                Action::StoreConst(Value::Bool(true)),
                arg.default.unwrap_or(Value::Bool(false)),
            ),
            ActionKind::StoreFalse => (
                Action::StoreConst(Value::Bool(false)),
                arg.default.unwrap_or(Value::Bool(true)),
            ),
            ActionKind::StoreConst => (
                Action::StoreConst(arg.constant.unwrap_or_default()),
                arg.default.unwrap_or_default(),
            ),
            ActionKind::Store => (
                Action::Store {
                    nargs: arg.nargs.unwrap_or_default(),
                    converter: arg.converter.unwrap_or_default(),
                },
                arg.default.unwrap_or_default(),
            ),
            ActionKind::Append => (
                Action::Append {
                    nargs: arg.nargs.unwrap_or_default(),
                    converter: arg.converter.unwrap_or_default(),
                },
                arg.default.unwrap_or_default(),
            ),
        };

        let named = arg.names.iter().any(|n| n.starts_with('-'));
        let (names, dest) = if named {
            if let Some(bad) = arg
                .names
                .iter()
                .find(|n| n.trim_start_matches('-').is_empty() || !n.starts_with('-'))
            {
                return Err(DefinitionError::InvalidSpelling(bad.clone()));
            }
            let dest = arg
                .dest
                .unwrap_or_else(|| dest_from_spellings(&arg.names));
            (arg.names, dest)
        } else {
            match (arg.names.len(), arg.dest) {
                (0, None) => return Err(DefinitionError::NoNames),
                (0, Some(dest)) => (vec![dest.clone()], dest),
                (1, dest) => {
                    let dest = dest.unwrap_or_else(|| arg.names[0].clone());
                    (arg.names, dest)
                }
                _ => return Err(DefinitionError::PositionalNames(arg.names)),
            }
        };

        let spec = Self {
            names,
            dest,
            action,
            default,
            required: arg.required,
            choices: arg.choices,
            help: arg.help,
            metavar: arg.metavar,
        };
        Ok((spec, named))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn dest(&self) -> &str {
        &self.dest
    }

    /// The first declared spelling; a positional's only name.
    pub fn primary_name(&self) -> &str {
        self.names.first().map_or(self.dest.as_str(), String::as_str)
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn choices(&self) -> Option<&[String]> {
        self.choices.as_deref()
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn metavar(&self) -> Option<&str> {
        self.metavar.as_deref()
    }

    pub fn matches(&self, spelling: &str) -> bool {
        self.names.iter().any(|n| n == spelling)
    }

    pub fn is_append(&self) -> bool {
        matches!(self.action, Action::Append { .. })
    }

    /// Consume this argument's value from the front of `tokens`.
    ///
    /// `spelling` is how the argument was invoked; it only appears in error messages.
    pub fn consume(&self, spelling: &str, tokens: &mut Tokens<'_>) -> Result<Value, ArgError> {
        let (nargs, converter) = match &self.action {
            Action::StoreConst(value) => return Ok(value.clone()),
            Action::Store { nargs, converter } | Action::Append { nargs, converter } => {
                (*nargs, converter)
            }
        };

        let missing = || ArgError::MissingValue {
            key: spelling.to_string(),
        };

        match nargs {
            Nargs::Single => {
                let tok = tokens.next().ok_or_else(missing)?;
                self.checked(spelling, converter, tok)
            }
            Nargs::Optional => match tokens.next() {
                Some(tok) => self.checked(spelling, converter, tok),
                None => Ok(self.default.clone()),
            },
            Nargs::Exactly(n) => {
                let items = self.collect(spelling, converter, tokens, Some(n))?;
                if items.len() < n {
                    return Err(missing());
                }
                Ok(Value::List(items))
            }
            Nargs::ZeroOrMore => Ok(Value::List(self.collect(spelling, converter, tokens, None)?)),
            Nargs::OneOrMore => {
                if tokens.is_empty() {
                    return Err(missing());
                }
                Ok(Value::List(self.collect(spelling, converter, tokens, None)?))
            }
        }
    }

    /// Collect up to `limit` tokens, stopping at the next option-looking token until a
    /// `--` separator has been seen.
    fn collect(
        &self,
        spelling: &str,
        converter: &Converter,
        tokens: &mut Tokens<'_>,
        limit: Option<usize>,
    ) -> Result<Vec<Value>, ArgError> {
        let mut items = Vec::new();
        let mut stop_at_option = true;
        while let Some(tok) = tokens.peek() {
            if limit.is_some_and(|n| items.len() >= n) {
                break;
            }
            if stop_at_option && looks_like_option(tok) {
                if tok != "--" {
                    break;
                }
                stop_at_option = false;
                tokens.next();
                continue;
            }
            tokens.next();
            items.push(self.checked(spelling, converter, tok)?);
        }
        Ok(items)
    }

    fn checked(&self, spelling: &str, converter: &Converter, tok: &str) -> Result<Value, ArgError> {
        // An empty choice set restricts nothing.
        if let Some(choices) = self.choices().filter(|c| !c.is_empty()) {
            if !choices.iter().any(|c| c == tok) {
                return Err(ArgError::InvalidChoice {
                    token: tok.to_string(),
                    choices: choices.to_vec(),
                });
            }
        }
        converter.convert(tok).map_err(|e| {
            tracing::debug!(dest = %self.dest, token = tok, reason = e.reason(), "conversion failed");
            ArgError::InvalidValue {
                key: spelling.to_string(),
                token: tok.to_string(),
                type_name: converter.type_name().map(str::to_string),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn spec(arg: Arg) -> ArgumentSpec {
        ArgumentSpec::from_arg(arg).unwrap().0
    }

    #[test]
    fn dest_prefers_last_long_spelling() {
        let names = argv(&["-o", "--out-file", "--output-path"]);
        assert_eq!(dest_from_spellings(&names), "output_path");
        assert_eq!(dest_from_spellings(&argv(&["-v"])), "v");
    }

    #[test]
    fn store_true_resolves_to_const_with_opposite_default() {
        let s = spec(Arg::new(["--verbose"]).action(ActionKind::StoreTrue));
        assert!(matches!(s.action(), Action::StoreConst(Value::Bool(true))));
        assert_eq!(s.default_value(), &Value::Bool(false));

        let s = spec(Arg::new(["--no-color"]).action(ActionKind::StoreFalse));
        assert_eq!(s.dest(), "no_color");
        assert_eq!(s.default_value(), &Value::Bool(true));
    }

    #[test]
    fn positional_without_name_uses_dest() {
        let (s, named) = ArgumentSpec::from_arg(Arg::default().dest("file")).unwrap();
        assert!(!named);
        assert_eq!(s.names(), ["file".to_string()]);
    }

    #[test]
    fn rejects_malformed_declarations() {
        assert_eq!(
            ArgumentSpec::from_arg(Arg::default()).unwrap_err(),
            DefinitionError::NoNames
        );
        assert!(matches!(
            ArgumentSpec::from_arg(Arg::new(["a", "b"])).unwrap_err(),
            DefinitionError::PositionalNames(_)
        ));
        assert_eq!(
            ArgumentSpec::from_arg(Arg::new(["-v", "--"])).unwrap_err(),
            DefinitionError::InvalidSpelling("--".to_string())
        );
    }

    #[test]
    fn single_consumes_even_option_looking_token() {
        let s = spec(Arg::new(["--pattern"]));
        let items = argv(&["-x", "rest"]);
        let mut tokens = Tokens::new(&items);
        assert_eq!(s.consume("--pattern", &mut tokens), Ok(Value::from("-x")));
        assert_eq!(tokens.peek(), Some("rest"));
    }

    #[test]
    fn single_fails_on_empty() {
        let s = spec(Arg::new(["--pattern"]));
        let items = argv(&[]);
        let err = s.consume("--pattern", &mut Tokens::new(&items)).unwrap_err();
        assert_eq!(err.to_string(), "expecting value for --pattern");
    }

    #[test]
    fn optional_yields_default_when_exhausted() {
        let s = spec(Arg::new(["--level"]).nargs(Nargs::Optional).default_value("low"));
        let items = argv(&[]);
        assert_eq!(
            s.consume("--level", &mut Tokens::new(&items)),
            Ok(Value::from("low"))
        );
    }

    #[test]
    fn exactly_stops_at_option_and_reports_missing() {
        let s = spec(Arg::new(["--pair"]).nargs(Nargs::Exactly(2)));
        let items = argv(&["a", "-b", "c"]);
        let mut tokens = Tokens::new(&items);
        assert!(matches!(
            s.consume("--pair", &mut tokens),
            Err(ArgError::MissingValue { .. })
        ));
    }

    #[test]
    fn exactly_leaves_surplus_tokens() {
        let s = spec(Arg::new(["--pair"]).nargs(Nargs::Exactly(2)).converter(Converter::int()));
        let items = argv(&["1", "2", "3"]);
        let mut tokens = Tokens::new(&items);
        assert_eq!(s.consume("--pair", &mut tokens), Ok(Value::from(vec![1i64, 2])));
        assert_eq!(tokens.remaining(), &items[2..]);
    }

    #[test]
    fn separator_disables_stop_rule_once() {
        let s = spec(Arg::new(["--files"]).nargs(Nargs::ZeroOrMore));
        let items = argv(&["a", "--", "-b", "--", "c"]);
        let mut tokens = Tokens::new(&items);
        assert_eq!(
            s.consume("--files", &mut tokens),
            Ok(Value::from(vec!["a", "-b", "--", "c"]))
        );
        assert!(tokens.is_empty());
    }

    #[test]
    fn separator_lets_fixed_count_take_dashed_tokens() {
        let s = spec(Arg::new(["--pair"]).nargs(Nargs::Exactly(2)));
        let items = argv(&["--", "-a", "b", "c"]);
        let mut tokens = Tokens::new(&items);
        assert_eq!(
            s.consume("--pair", &mut tokens),
            Ok(Value::from(vec!["-a", "b"]))
        );
        assert_eq!(tokens.peek(), Some("c"));
    }

    #[test]
    fn empty_choices_accept_any_token() {
        let s = spec(Arg::new(["--fmt"]).choices(Vec::<String>::new()));
        let items = argv(&["json"]);
        assert_eq!(
            s.consume("--fmt", &mut Tokens::new(&items)),
            Ok(Value::from("json"))
        );
    }

    #[test]
    fn zero_or_more_vs_one_or_more_on_empty() {
        let items = argv(&[]);
        let star = spec(Arg::new(["--x"]).nargs(Nargs::ZeroOrMore));
        assert_eq!(
            star.consume("--x", &mut Tokens::new(&items)),
            Ok(Value::List(Vec::new()))
        );
        let plus = spec(Arg::new(["--x"]).nargs(Nargs::OneOrMore));
        assert!(matches!(
            plus.consume("--x", &mut Tokens::new(&items)),
            Err(ArgError::MissingValue { .. })
        ));
    }

    #[test]
    fn one_or_more_may_collect_nothing_before_an_option() {
        let plus = spec(Arg::new(["--x"]).nargs(Nargs::OneOrMore));
        let items = argv(&["--y"]);
        assert_eq!(
            plus.consume("--x", &mut Tokens::new(&items)),
            Ok(Value::List(Vec::new()))
        );
    }

    #[test]
    fn choices_checked_on_raw_token() {
        let s = spec(Arg::new(["--format"]).choices(["json", "text"]));
        let items = argv(&["xml"]);
        let err = s.consume("--format", &mut Tokens::new(&items)).unwrap_err();
        assert_eq!(err.to_string(), "value xml must be one of this 'json, text'");
    }

    #[test]
    fn store_const_consumes_nothing() {
        let s = spec(Arg::new(["--mode"]).action(ActionKind::StoreConst).constant(7));
        let items = argv(&["x"]);
        let mut tokens = Tokens::new(&items);
        assert_eq!(s.consume("--mode", &mut tokens), Ok(Value::Int(7)));
        assert_eq!(tokens.position(), 0);
    }
}
