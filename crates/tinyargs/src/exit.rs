//! Process-level glue: read the live invocation, print help or errors, and exit.
//!
//! Everything else in the crate returns typed outcomes; only these helpers terminate the
//! process.

use std::io::Write;
use std::process;

use crate::error::ArgError;
use crate::namespace::Namespace;
use crate::parser::{ArgumentParser, ParseOutcome, ParseResult};

/// The live invocation's arguments, without the program name.
pub fn env_tokens() -> Vec<String> {
    std::env::args().skip(1).collect()
}

impl ArgumentParser {
    /// Short usage followed by `error: <message>`, as printed on a failed parse.
    pub fn format_error(&self, err: &ArgError) -> String {
        format!("{}error: {err}\n", self.format_usage())
    }

    /// Strict-parse the live invocation, exiting on help (0) or error (2).
    pub fn parse_args_or_exit(&self) -> Namespace {
        self.exit_on_failure(self.parse_args(&env_tokens()))
    }

    /// Tolerant-parse the live invocation, exiting on help (0) or error (2).
    pub fn parse_known_args_or_exit(&self) -> (Namespace, Vec<String>) {
        self.exit_on_failure(self.parse_known_args(&env_tokens()))
    }

    /// Unwrap a parse result, printing help to stdout or the error to stderr and exiting
    /// when there is nothing to return.
    pub fn exit_on_failure<T>(&self, result: ParseResult<T>) -> T {
        match result {
            Ok(ParseOutcome::Parsed(value)) => value,
            Ok(ParseOutcome::Help(text)) => {
                let mut stdout = std::io::stdout().lock();
                let _ = stdout.write_all(text.as_bytes());
                let _ = stdout.flush();
                process::exit(0);
            }
            Err(err) => {
                tracing::debug!(error = %err, "argument parsing failed");
                let mut stderr = std::io::stderr().lock();
                let _ = stderr.write_all(self.format_error(&err).as_bytes());
                let _ = stderr.flush();
                process::exit(err.exit_code());
            }
        }
    }
}
