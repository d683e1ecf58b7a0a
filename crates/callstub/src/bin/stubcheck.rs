//! Callstub Fixture Checker CLI
//!
//! Loads a stub file, validates every stub in it and optionally resolves one
//! call against it.
//!
//! Usage:
//!   stubcheck stubs.yaml
//!   stubcheck stubs.yaml --method GET --url /users --param page=1

use anyhow::Context;
use callstub::{EngineError, MatchAttributes, MatchMode, Method, MockConfig, StubFile};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Callstub Fixture Checker - validate stub files and try calls against them
#[derive(Parser, Debug)]
#[command(name = "stubcheck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Stub file (YAML or JSON)
    #[arg(required = true)]
    file: PathBuf,

    /// HTTP method of the call to resolve
    #[arg(short, long, default_value = "GET")]
    method: String,

    /// URI of the call to resolve; without it only validation runs
    #[arg(short, long)]
    url: Option<String>,

    /// Request header, as NAME=VALUE (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Query parameter, as NAME=VALUE (repeatable); JSON scalars keep their type
    #[arg(short, long = "param")]
    params: Vec<String>,

    /// Request body as JSON
    #[arg(short, long)]
    body: Option<String>,

    /// Match mode, overriding the file's
    #[arg(long, env = "CALLSTUB_MATCH_MODE")]
    mode: Option<MatchMode>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{RED}error:{RESET} {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns whether the check passed.
fn run(args: &Args) -> anyhow::Result<bool> {
    let mut stub_file = StubFile::from_file(&args.file)?;
    if let Some(mode) = args.mode {
        stub_file.match_mode = Some(mode);
    }
    let session = stub_file.into_session(MockConfig::default());
    debug!("Using {} match mode", session.match_mode().as_str());

    let Some(url) = &args.url else {
        let total = session.registered().len();
        let invalid = match session.validate() {
            Ok(()) => Vec::new(),
            Err(EngineError::InvalidDefinitions(invalid)) => invalid,
            Err(other) => return Err(other.into()),
        };
        if args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "stubs": total,
                    "invalid": invalid,
                }))?
            );
        } else if invalid.is_empty() {
            println!("{GREEN}✓{RESET} {BOLD}{total}{RESET} stub(s) valid");
        } else {
            println!("{RED}✗{RESET} {} incomplete stub(s):", invalid.len());
            for stub in &invalid {
                println!("  {DIM}-{RESET} {stub}");
            }
        }
        return Ok(invalid.is_empty());
    };

    let method: Method = args.method.parse()?;
    let attributes = build_attributes(args)?;
    let result = session.dispatch(method, url, Some(attributes));

    match (&result, args.json) {
        (Ok(response), true) => println!("{}", serde_json::to_string_pretty(response)?),
        (Ok(response), false) => {
            println!("{GREEN}✓{RESET} {method} {url} -> {BOLD}{}{RESET}", response.status);
            for (name, value) in &response.headers {
                println!("  {DIM}{name}:{RESET} {value}");
            }
            if let Some(body) = &response.body {
                println!("{}", serde_json::to_string_pretty(body)?);
            }
        }
        (Err(err), true) => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "error": err.to_string(),
                "diagnostics": err.diagnostics(),
            }))?
        ),
        (Err(err), false) => print_error(err),
    }
    Ok(result.is_ok())
}

fn print_error(err: &EngineError) {
    println!("{RED}✗{RESET} {err}");
}

fn build_attributes(args: &Args) -> anyhow::Result<MatchAttributes> {
    let mut attributes = MatchAttributes::default();
    for header in &args.headers {
        let (name, value) = split_pair(header)?;
        attributes = attributes.header(name, value);
    }
    for param in &args.params {
        let (name, value) = split_pair(param)?;
        attributes = attributes.param(name, parse_scalar(value));
    }
    if let Some(body) = &args.body {
        let body: serde_json::Value =
            serde_json::from_str(body).context("--body must be valid JSON")?;
        attributes = attributes.body(body);
    }
    Ok(attributes)
}

/// `1`, `true` and `null` keep their JSON type; anything else is a string.
fn parse_scalar(raw: &str) -> serde_json::Value {
    match serde_json::from_str(raw) {
        Ok(value @ (serde_json::Value::Number(_)
        | serde_json::Value::Bool(_)
        | serde_json::Value::Null
        | serde_json::Value::String(_))) => value,
        _ => serde_json::Value::String(raw.to_string()),
    }
}

fn split_pair(raw: &str) -> anyhow::Result<(&str, &str)> {
    raw.split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Expected NAME=VALUE, got '{raw}'"))
}
