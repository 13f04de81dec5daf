use std::path::Path;

use tracing::{debug, trace};

use crate::error::{ArgError, DefinitionError};
use crate::namespace::Namespace;
use crate::spec::{Arg, ArgumentSpec};
use crate::tokens::{Tokens, is_option_spelling};
use crate::usage;
use crate::value::Value;

const HELP_SHORT: &str = "-h";
const HELP_LONG: &str = "--help";

/// Terminal outcome of a successful parse call.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    Parsed(T),
    /// `-h`/`--help` was given; carries the rendered help text.
    Help(String),
}

impl<T> ParseOutcome<T> {
    pub fn parsed(self) -> Option<T> {
        match self {
            Self::Parsed(v) => Some(v),
            Self::Help(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseOutcome<U> {
        match self {
            Self::Parsed(v) => ParseOutcome::Parsed(f(v)),
            Self::Help(text) => ParseOutcome::Help(text),
        }
    }
}

pub type ParseResult<T> = Result<ParseOutcome<T>, ArgError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Strict,
    Tolerant,
}

/// Declared arguments plus display metadata.
///
/// Parsing never mutates the parser, so one instance can serve any number of parse calls,
/// including from several threads.
#[derive(Debug, Clone, Default)]
pub struct ArgumentParser {
    prog: String,
    description: String,
    epilog: String,
    named: Vec<ArgumentSpec>,
    positional: Vec<ArgumentSpec>,
}

impl ArgumentParser {
    pub fn new(prog: impl Into<String>) -> Self {
        Self {
            prog: prog.into(),
            ..Default::default()
        }
    }

    /// A parser named after the running executable.
    pub fn from_env() -> Self {
        let prog = std::env::args()
            .next()
            .map(|argv0| {
                Path::new(&argv0)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or(argv0)
            })
            .unwrap_or_default();
        Self::new(prog)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_epilog(mut self, epilog: impl Into<String>) -> Self {
        self.epilog = epilog.into();
        self
    }

    pub fn prog(&self) -> &str {
        &self.prog
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn epilog(&self) -> &str {
        &self.epilog
    }

    /// Named (option) specs in declaration order.
    pub fn named(&self) -> &[ArgumentSpec] {
        &self.named
    }

    /// Positional specs in declaration order.
    pub fn positional(&self) -> &[ArgumentSpec] {
        &self.positional
    }

    /// Register an argument. Spellings starting with `-` make it a named option.
    pub fn add_argument(&mut self, arg: Arg) -> Result<&mut Self, DefinitionError> {
        let (spec, named) = ArgumentSpec::from_arg(arg)?;
        trace!(dest = spec.dest(), named, "registered argument");
        if named {
            self.named.push(spec);
        } else {
            self.positional.push(spec);
        }
        Ok(self)
    }

    /// One-line usage synopsis.
    pub fn format_usage(&self) -> String {
        usage::synopsis(self)
    }

    /// Full help text.
    pub fn format_help(&self) -> String {
        usage::help(self)
    }

    /// Parse `argv`, failing on unknown options and leftover tokens.
    pub fn parse_args(&self, argv: &[String]) -> ParseResult<Namespace> {
        self.parse_impl(argv, Mode::Strict)
            .map(|outcome| outcome.map(|(values, _)| values))
    }

    /// Parse `argv`, collecting unknown options and leftover tokens instead of failing.
    pub fn parse_known_args(&self, argv: &[String]) -> ParseResult<(Namespace, Vec<String>)> {
        self.parse_impl(argv, Mode::Tolerant)
    }

    fn parse_impl(&self, argv: &[String], mode: Mode) -> ParseResult<(Namespace, Vec<String>)> {
        debug!(prog = %self.prog, tokens = argv.len(), ?mode, "parsing arguments");

        let mut tokens = Tokens::new(argv);
        let mut named_values: Vec<Value> = self
            .named
            .iter()
            .map(|spec| spec.default_value().clone())
            .collect();
        let mut positional_values: Vec<Value> = Vec::with_capacity(self.positional.len());
        let mut unknown: Vec<String> = Vec::new();
        let mut positional_done = false;

        while !tokens.is_empty() || !positional_done {
            if let Some(tok) = tokens.peek().filter(|t| is_option_spelling(t)) {
                tokens.next();
                if tok == HELP_SHORT || tok == HELP_LONG {
                    debug!("help requested");
                    return Ok(ParseOutcome::Help(self.format_help()));
                }

                let mut found = false;
                for (idx, spec) in self.named.iter().enumerate() {
                    if !spec.matches(tok) {
                        continue;
                    }
                    found = true;
                    let value = spec.consume(tok, &mut tokens)?;
                    trace!(dest = spec.dest(), %value, "matched option {tok}");
                    if spec.is_append() {
                        push_appended(&mut named_values[idx], value);
                    } else {
                        named_values[idx] = value;
                        break;
                    }
                }

                if !found {
                    match mode {
                        Mode::Strict => return Err(ArgError::UnknownOption(tok.to_string())),
                        Mode::Tolerant => {
                            debug!(option = tok, "collecting unknown option");
                            unknown.push(tok.to_string());
                            tokens.sweep_bare_into(&mut unknown);
                        }
                    }
                }
                continue;
            }

            if positional_done {
                match mode {
                    Mode::Strict => {
                        return Err(ArgError::ExtraArguments(tokens.remaining().to_vec()));
                    }
                    Mode::Tolerant => {
                        unknown.extend(tokens.take_rest().iter().cloned());
                        break;
                    }
                }
            }

            trace!(at = tokens.position(), "entering positional phase");
            for spec in &self.positional {
                positional_values.push(spec.consume(spec.primary_name(), &mut tokens)?);
            }
            positional_done = true;
            if mode == Mode::Tolerant {
                tokens.sweep_bare_into(&mut unknown);
            }
        }

        let missing: Vec<String> = self
            .named
            .iter()
            .zip(&named_values)
            .filter(|(spec, value)| spec.required() && value.is_none())
            .map(|(spec, _)| spec.dest().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ArgError::MissingRequired(missing));
        }

        let mut values = Namespace::default();
        for (spec, value) in self.named.iter().zip(named_values) {
            values.insert(spec.dest(), value);
        }
        for (spec, value) in self.positional.iter().zip(positional_values) {
            values.insert(spec.dest(), value);
        }
        Ok(ParseOutcome::Parsed((values, unknown)))
    }
}

/// Append onto the list at `slot`, starting a fresh list when the slot holds anything else.
fn push_appended(slot: &mut Value, value: Value) {
    match slot {
        Value::List(items) => items.push(value),
        other => *other = Value::List(vec![value]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActionKind, Converter, Nargs};

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn count_and_name() -> ArgumentParser {
        let mut p = ArgumentParser::new("prog");
        p.add_argument(
            Arg::new(["--count"])
                .converter(Converter::int())
                .default_value(0),
        )
        .unwrap()
        .add_argument(Arg::positional("name"))
        .unwrap();
        p
    }

    fn parse(p: &ArgumentParser, items: &[&str]) -> Result<Namespace, ArgError> {
        p.parse_args(&argv(items))
            .map(|outcome| outcome.parsed().expect("unexpected help outcome"))
    }

    #[test]
    fn count_and_name_scenario() {
        let p = count_and_name();

        let ns = parse(&p, &["--count", "3", "alice"]).unwrap();
        assert_eq!(ns.get_int("count"), Some(3));
        assert_eq!(ns.get_str("name"), Some("alice"));

        let ns = parse(&p, &["alice"]).unwrap();
        assert_eq!(ns.get_int("count"), Some(0));
        assert_eq!(ns.get_str("name"), Some("alice"));

        let err = parse(&p, &["--count", "x", "alice"]).unwrap_err();
        assert_eq!(
            err,
            ArgError::InvalidValue {
                key: "--count".to_string(),
                token: "x".to_string(),
                type_name: Some("int".to_string()),
            }
        );
    }

    #[test]
    fn flag_does_not_swallow_positional() {
        let mut p = ArgumentParser::new("prog");
        p.add_argument(Arg::new(["--flag"]).action(ActionKind::StoreTrue))
            .unwrap();
        p.add_argument(Arg::positional("item")).unwrap();
        let ns = parse(&p, &["--flag", "x"]).unwrap();
        assert_eq!(ns.get_bool("flag"), Some(true));
        assert_eq!(ns.get_str("item"), Some("x"));
    }

    #[test]
    fn defaults_are_stable_across_calls() {
        let mut p = ArgumentParser::new("prog");
        p.add_argument(Arg::new(["-q", "--quiet"]).action(ActionKind::StoreTrue))
            .unwrap();
        p.add_argument(Arg::new(["--level"]).default_value("info"))
            .unwrap();
        p.add_argument(Arg::new(["--tag"]).action(ActionKind::Append))
            .unwrap();

        let first = parse(&p, &[]).unwrap();
        for _ in 0..3 {
            assert_eq!(parse(&p, &[]).unwrap(), first);
        }
        assert_eq!(first.get_bool("quiet"), Some(false));
        assert_eq!(first.get_str("level"), Some("info"));
        assert_eq!(first.get("tag"), Some(&Value::None));
    }

    #[test]
    fn append_accumulates_and_does_not_leak_between_calls() {
        let mut p = ArgumentParser::new("prog");
        p.add_argument(
            Arg::new(["-I", "--include"])
                .action(ActionKind::Append)
                .default_value(Vec::<Value>::new()),
        )
        .unwrap();

        let ns = parse(&p, &["-I", "a", "--include", "b"]).unwrap();
        assert_eq!(ns["include"], Value::from(vec!["a", "b"]));

        let ns = parse(&p, &["-I", "c"]).unwrap();
        assert_eq!(ns["include"], Value::from(vec!["c"]));
    }

    #[test]
    fn append_replaces_scalar_default_with_fresh_list() {
        let mut p = ArgumentParser::new("prog");
        p.add_argument(
            Arg::new(["-t", "--tag"])
                .action(ActionKind::Append)
                .default_value("none"),
        )
        .unwrap();

        let ns = parse(&p, &[]).unwrap();
        assert_eq!(ns.get_str("tag"), Some("none"));

        let ns = parse(&p, &["-t", "a", "-t", "b"]).unwrap();
        assert_eq!(ns["tag"], Value::from(vec!["a", "b"]));
        assert_eq!(p.named()[0].default_value(), &Value::from("none"));
    }

    #[test]
    fn append_with_multi_arity_nests_lists() {
        let mut p = ArgumentParser::new("prog");
        p.add_argument(
            Arg::new(["--point"])
                .action(ActionKind::Append)
                .nargs(Nargs::Exactly(2))
                .converter(Converter::int()),
        )
        .unwrap();
        let ns = parse(&p, &["--point", "1", "2", "--point", "3", "4"]).unwrap();
        assert_eq!(
            ns["point"],
            Value::List(vec![Value::from(vec![1i64, 2]), Value::from(vec![3i64, 4])])
        );
    }

    #[test]
    fn first_matching_store_spec_wins() {
        let mut p = ArgumentParser::new("prog");
        p.add_argument(Arg::new(["-o", "--out"])).unwrap();
        p.add_argument(Arg::new(["-o", "--other"])).unwrap();
        let ns = parse(&p, &["-o", "x"]).unwrap();
        assert_eq!(ns.get_str("out"), Some("x"));
        assert_eq!(ns.get("other"), Some(&Value::None));
    }

    #[test]
    fn unknown_option_is_rejected_in_strict_mode() {
        let p = count_and_name();
        let err = parse(&p, &["--nope", "alice"]).unwrap_err();
        assert_eq!(err, ArgError::UnknownOption("--nope".to_string()));
    }

    #[test]
    fn second_positional_run_is_extra() {
        let p = count_and_name();
        let err = parse(&p, &["alice", "--count", "2", "bob", "carol"]).unwrap_err();
        assert_eq!(
            err,
            ArgError::ExtraArguments(vec!["bob".to_string(), "carol".to_string()])
        );
        assert_eq!(err.to_string(), "extra args: bob carol");
    }

    #[test]
    fn missing_positional_value() {
        let p = count_and_name();
        let err = parse(&p, &["--count", "2"]).unwrap_err();
        assert_eq!(
            err,
            ArgError::MissingValue {
                key: "name".to_string()
            }
        );
    }

    #[test]
    fn required_options_are_listed_together() {
        let mut p = ArgumentParser::new("prog");
        p.add_argument(Arg::new(["--user"]).required(true)).unwrap();
        p.add_argument(Arg::new(["--api-key"]).required(true))
            .unwrap();
        p.add_argument(Arg::new(["--region"]).required(true).default_value("eu"))
            .unwrap();

        let err = parse(&p, &[]).unwrap_err();
        assert_eq!(
            err,
            ArgError::MissingRequired(vec!["user".to_string(), "api_key".to_string()])
        );

        let err = parse(&p, &["--user", "me"]).unwrap_err();
        assert_eq!(err, ArgError::MissingRequired(vec!["api_key".to_string()]));
    }

    #[test]
    fn zero_positional_parser_still_checks_required() {
        let mut p = ArgumentParser::new("prog");
        p.add_argument(Arg::new(["--token"]).required(true)).unwrap();
        assert!(matches!(
            parse(&p, &[]),
            Err(ArgError::MissingRequired(_))
        ));
    }

    #[test]
    fn help_short_circuits_parsing() {
        let p = count_and_name();
        let outcome = p.parse_args(&argv(&["--count", "x", "-h"]));
        assert!(outcome.is_err(), "conversion errors come first");

        let outcome = p.parse_args(&argv(&["--help", "--bogus"])).unwrap();
        let ParseOutcome::Help(text) = outcome else {
            panic!("expected help");
        };
        assert!(text.contains("Named arguments:"));
        assert!(text.contains("--count"));
    }

    #[test]
    fn lone_dash_is_positional() {
        let p = count_and_name();
        let ns = parse(&p, &["-"]).unwrap();
        assert_eq!(ns.get_str("name"), Some("-"));
    }

    #[test]
    fn variadic_positionals_split_on_options() {
        let mut p = ArgumentParser::new("prog");
        p.add_argument(Arg::new(["-v"]).action(ActionKind::StoreTrue))
            .unwrap();
        p.add_argument(Arg::positional("files").nargs(Nargs::OneOrMore))
            .unwrap();
        let ns = parse(&p, &["a", "b", "-v"]).unwrap();
        assert_eq!(ns["files"], Value::from(vec!["a", "b"]));
        assert_eq!(ns.get_bool("v"), Some(true));
    }

    #[test]
    fn tolerant_mode_round_trip() {
        let p = count_and_name();
        let strict = parse(&p, &["--count", "3", "alice"]).unwrap();
        let (known, unknown) = p
            .parse_known_args(&argv(&["--count", "3", "alice", "--extra"]))
            .unwrap()
            .parsed()
            .unwrap();
        assert_eq!(known, strict);
        assert_eq!(unknown, vec!["--extra".to_string()]);
    }

    #[test]
    fn tolerant_mode_sweeps_bare_tokens() {
        let p = count_and_name();
        let (known, unknown) = p
            .parse_known_args(&argv(&[
                "--color", "red", "alice", "--count", "1", "bob", "carol", "-", "dave",
            ]))
            .unwrap()
            .parsed()
            .unwrap();
        // The sweep after an unknown option absorbs `alice`, so `bob` is the first
        // positional run; `carol` is swept after it and `-` ends the run.
        assert_eq!(unknown, ["--color", "red", "alice", "carol", "-", "dave"]);
        assert_eq!(known.get_str("name"), Some("bob"));
        assert_eq!(known.get_int("count"), Some(1));
    }

    #[test]
    fn result_order_is_named_then_positional() {
        let mut p = ArgumentParser::new("prog");
        p.add_argument(Arg::positional("src")).unwrap();
        p.add_argument(Arg::new(["--b"])).unwrap();
        p.add_argument(Arg::new(["--a"])).unwrap();
        let ns = parse(&p, &["x"]).unwrap();
        let keys: Vec<&str> = ns.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "a", "src"]);
    }

    #[test]
    fn parser_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ArgumentParser>();

        let p = count_and_name();
        std::thread::scope(|s| {
            for n in 0..4 {
                let p = &p;
                s.spawn(move || {
                    let ns = parse(p, &["--count", &n.to_string(), "x"]).unwrap();
                    assert_eq!(ns.get_int("count"), Some(n));
                });
            }
        });
    }
}
