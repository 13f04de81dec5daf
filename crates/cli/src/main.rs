mod check;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tinyargs::{ArgumentParser, Namespace};
use tinyargs_schema::ParserSchema;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "tinyargs")]
#[command(version, about = "Parse command lines against a JSON argument schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse tokens against a schema and print the result as JSON
    Parse(ParseArgs),

    /// Print the usage text a schema produces
    Usage(UsageArgs),

    /// Validate a schema and report its arguments
    Check(CheckArgs),
}

#[derive(Parser)]
struct ParseArgs {
    /// Path to the JSON argument schema
    #[arg(short, long, value_name = "FILE")]
    schema: PathBuf,

    /// Collect unknown options and extra tokens instead of failing
    #[arg(long)]
    known: bool,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,

    /// Tokens to parse, given after `--`
    #[arg(last = true, value_name = "TOKENS")]
    tokens: Vec<String>,
}

#[derive(Parser)]
struct UsageArgs {
    /// Path to the JSON argument schema
    #[arg(short, long, value_name = "FILE")]
    schema: PathBuf,

    /// Print the full help listing instead of the synopsis
    #[arg(long)]
    full: bool,
}

#[derive(Parser)]
struct CheckArgs {
    /// Path to the JSON argument schema
    #[arg(short, long, value_name = "FILE")]
    schema: PathBuf,

    /// Only output JSON (no human-readable output)
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ParseReport<'a> {
    args: &'a Namespace,
    #[serde(skip_serializing_if = "Option::is_none")]
    unknown: Option<&'a [String]>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse(args) => parse_command(args),
        Commands::Usage(args) => usage_command(args),
        Commands::Check(args) => check_command(args),
    }
}

/// Build the parser a schema file declares, naming it after the file when the schema
/// gives no `prog`.
fn load_parser(schema_path: &Path) -> Result<ArgumentParser> {
    let mut schema = ParserSchema::from_file(schema_path)?;
    if schema.prog.is_empty() {
        schema.prog = schema_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "prog".to_string());
    }
    schema
        .build()
        .with_context(|| format!("invalid schema: {}", schema_path.display()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

fn parse_command(args: ParseArgs) -> Result<()> {
    tracing::debug!("executing parse command");

    let parser = load_parser(&args.schema)?;

    // Help exits 0 and parse errors exit 2 inside `exit_on_failure`.
    if args.known {
        let (values, unknown) = parser.exit_on_failure(parser.parse_known_args(&args.tokens));
        let report = ParseReport {
            args: &values,
            unknown: Some(unknown.as_slice()),
        };
        print_json(&report, args.pretty)
    } else {
        let values = parser.exit_on_failure(parser.parse_args(&args.tokens));
        let report = ParseReport {
            args: &values,
            unknown: None,
        };
        print_json(&report, args.pretty)
    }
}

fn usage_command(args: UsageArgs) -> Result<()> {
    tracing::debug!("executing usage command");

    let parser = load_parser(&args.schema)?;
    if args.full {
        print!("{}", parser.format_help());
    } else {
        print!("{}", parser.format_usage());
    }
    Ok(())
}

fn check_command(args: CheckArgs) -> Result<()> {
    tracing::debug!("executing check command");

    let report = check::check_schema(&args.schema)?;

    if args.json {
        print_json(&report, true)?;
        if report.has_problems() {
            std::process::exit(1);
        }
        return Ok(());
    }

    eprintln!();
    eprintln!("=== Schema Check Results ===");
    eprintln!("Schema: {}", report.schema);
    if !report.prog.is_empty() {
        eprintln!("Program: {}", report.prog);
    }
    eprintln!(
        "Arguments: {} named, {} positional",
        report.named.len(),
        report.positional.len()
    );
    for arg in report.named.iter().chain(&report.positional) {
        match &arg.nargs {
            Some(nargs) => eprintln!(
                "  {:<24} -> {} ({}, nargs {})",
                arg.names.join(", "),
                arg.dest,
                arg.action,
                nargs
            ),
            None => eprintln!(
                "  {:<24} -> {} ({})",
                arg.names.join(", "),
                arg.dest,
                arg.action
            ),
        }
    }

    if !report.has_problems() {
        eprintln!("OK: schema is well-formed");
        return Ok(());
    }

    eprintln!();
    for dest in &report.duplicate_dests {
        eprintln!("WARNING: dest '{dest}' is declared more than once");
    }
    for spelling in &report.shadowed_spellings {
        eprintln!("WARNING: spelling '{spelling}' is claimed by an earlier argument");
    }
    eprintln!();
    bail!("schema has conflicting declarations");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
