//! Usage and help text rendering.

use crate::parser::ArgumentParser;
use crate::spec::{Action, ArgumentSpec, Nargs};

const HELP_SPELLINGS: &str = "-h, --help";
const HELP_TEXT: &str = "show this message and exit";
const MIN_NAME_WIDTH: usize = 18;

fn value_label(spec: &ArgumentSpec) -> String {
    if let Some(metavar) = spec.metavar() {
        metavar.to_uppercase()
    } else if let Some(choices) = spec.choices().filter(|c| !c.is_empty()) {
        format!("[{}]", choices.join(", "))
    } else {
        spec.dest().to_uppercase()
    }
}

/// The value hint after an argument's spellings, with a leading space, or empty for flags.
fn format_value_hint(spec: &ArgumentSpec) -> String {
    let nargs = match spec.action() {
        Action::Store { nargs, .. } | Action::Append { nargs, .. } => *nargs,
        Action::StoreConst(_) => return String::new(),
    };
    let label = value_label(spec);
    match nargs {
        Nargs::Single => format!(" {label}"),
        Nargs::Exactly(n) => format!(" {label}(x{n})"),
        Nargs::Optional | Nargs::ZeroOrMore | Nargs::OneOrMore => format!(" [{label}...]"),
    }
}

/// One-line synopsis, newline-terminated.
pub fn synopsis(parser: &ArgumentParser) -> String {
    let mut out = format!("usage: {} [{HELP_SPELLINGS}]", parser.prog());
    for spec in parser.named() {
        out.push_str(&format!(
            " [{}{}]",
            spec.names().join(", "),
            format_value_hint(spec)
        ));
    }
    for spec in parser.positional() {
        out.push_str(&format_value_hint(spec));
    }
    out.push('\n');
    out
}

fn push_rows(out: &mut String, rows: &[(String, String)]) {
    let width = rows
        .iter()
        .map(|(left, _)| left.len())
        .max()
        .unwrap_or(0)
        .max(MIN_NAME_WIDTH);
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("  {left}\n"));
        } else {
            out.push_str(&format!("  {:width$}  {}\n", left, help, width = width));
        }
    }
}

/// Synopsis followed by the description, argument listings and epilog.
pub fn help(parser: &ArgumentParser) -> String {
    let mut out = synopsis(parser);
    out.push('\n');

    if !parser.description().trim().is_empty() {
        out.push_str(parser.description().trim_end());
        out.push('\n');
    }

    if !parser.positional().is_empty() {
        out.push_str("\nPositional arguments:\n");
        let rows: Vec<(String, String)> = parser
            .positional()
            .iter()
            .map(|spec| (spec.primary_name().to_string(), spec.help().trim().to_string()))
            .collect();
        push_rows(&mut out, &rows);
    }

    out.push_str("\nNamed arguments:\n");
    let mut rows = vec![(HELP_SPELLINGS.to_string(), HELP_TEXT.to_string())];
    rows.extend(
        parser
            .named()
            .iter()
            .map(|spec| (spec.names().join(", "), spec.help().trim().to_string())),
    );
    push_rows(&mut out, &rows);

    if !parser.epilog().trim().is_empty() {
        out.push('\n');
        out.push_str(parser.epilog().trim_end());
        out.push('\n');
    }

    out
}
