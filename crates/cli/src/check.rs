use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tinyargs::{Action, ArgumentParser, ArgumentSpec, Value};
use tinyargs_schema::ParserSchema;

const HELP_SPELLINGS: [&str; 2] = ["-h", "--help"];

#[derive(Debug, Serialize)]
pub struct ArgSummary {
    pub dest: String,
    pub names: Vec<String>,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nargs: Option<String>,
    pub required: bool,
    pub default: Value,
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub schema: String,
    pub prog: String,
    pub named: Vec<ArgSummary>,
    pub positional: Vec<ArgSummary>,
    /// Dests declared by more than one argument; the later one wins in the result.
    pub duplicate_dests: Vec<String>,
    /// Spellings that can never reach their argument because an earlier one claims them.
    pub shadowed_spellings: Vec<String>,
}

impl CheckReport {
    pub fn has_problems(&self) -> bool {
        !self.duplicate_dests.is_empty() || !self.shadowed_spellings.is_empty()
    }
}

fn summarize(spec: &ArgumentSpec) -> ArgSummary {
    let (action, nargs) = match spec.action() {
        Action::Store { nargs, .. } => ("store", Some(nargs.to_string())),
        Action::Append { nargs, .. } => ("append", Some(nargs.to_string())),
        Action::StoreConst(_) => ("store_const", None),
    };
    ArgSummary {
        dest: spec.dest().to_string(),
        names: spec.names().to_vec(),
        action,
        nargs,
        required: spec.required(),
        default: spec.default_value().clone(),
    }
}

fn duplicate_dests(parser: &ArgumentParser) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for spec in parser.named().iter().chain(parser.positional()) {
        *counts.entry(spec.dest()).or_default() += 1;
    }
    let mut dups: Vec<String> = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(dest, _)| dest.to_string())
        .collect();
    dups.sort();
    dups
}

fn shadowed_spellings(parser: &ArgumentParser) -> Vec<String> {
    // A non-append match stops the scan, so later specs never see that spelling.
    let mut claimed: HashSet<&str> = HELP_SPELLINGS.into_iter().collect();
    let mut shadowed = Vec::new();
    for spec in parser.named() {
        for name in spec.names() {
            if claimed.contains(name.as_str()) && !shadowed.contains(name) {
                shadowed.push(name.clone());
            }
        }
        if !spec.is_append() {
            claimed.extend(spec.names().iter().map(String::as_str));
        }
    }
    shadowed
}

pub fn check_schema(schema_path: &Path) -> Result<CheckReport> {
    let schema = ParserSchema::from_file(schema_path)?;
    let parser = schema
        .build()
        .with_context(|| format!("invalid schema: {}", schema_path.display()))?;

    tracing::debug!(
        named = parser.named().len(),
        positional = parser.positional().len(),
        "schema loaded"
    );

    Ok(CheckReport {
        schema: schema_path.display().to_string(),
        prog: parser.prog().to_string(),
        named: parser.named().iter().map(summarize).collect(),
        positional: parser.positional().iter().map(summarize).collect(),
        duplicate_dests: duplicate_dests(&parser),
        shadowed_spellings: shadowed_spellings(&parser),
    })
}
