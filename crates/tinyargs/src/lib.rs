//! Compact argparse-style argument parsing.
//!
//! Declare named options and positionals with types, arities, defaults and constraints,
//! then turn a token list into a [`Namespace`]:
//!
//! ```
//! use tinyargs::{Arg, ArgumentParser, Converter, ParseOutcome};
//!
//! let mut parser = ArgumentParser::new("greet");
//! parser
//!     .add_argument(Arg::new(["--count"]).converter(Converter::int()).default_value(0))?
//!     .add_argument(Arg::positional("name"))?;
//!
//! let argv = vec!["--count".to_string(), "3".to_string(), "alice".to_string()];
//! let ParseOutcome::Parsed(ns) = parser.parse_args(&argv)? else {
//!     unreachable!("no --help given");
//! };
//! assert_eq!(ns.get_int("count"), Some(3));
//! assert_eq!(ns.get_str("name"), Some("alice"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Parsing never exits the process. [`ArgumentParser::parse_args_or_exit`] is the thin
//! layer that prints help or errors and terminates like a conventional CLI.

pub mod error;
pub mod exit;
pub mod namespace;
pub mod parser;
pub mod spec;
pub mod tokens;
pub mod usage;
pub mod value;

pub use error::{ArgError, ConversionError, DefinitionError, PARSE_ERROR_EXIT_CODE};
pub use exit::env_tokens;
pub use namespace::Namespace;
pub use parser::{ArgumentParser, ParseOutcome, ParseResult};
pub use spec::{Action, ActionKind, Arg, ArgumentSpec, Nargs};
pub use tokens::Tokens;
pub use value::{Converter, Value};
