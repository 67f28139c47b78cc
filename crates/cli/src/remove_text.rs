//! remove-all-text - Remove all text from a PDF document
//!
//! Rewrites every page, and every form the pages draw, without the
//! text-showing operators, and saves the result to a new file.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use untext_core::PdfError;
use untext_core::api::{EditOptions, EditReport, remove_text_from_file};
use untext_core::codec::Compression;
use untext_core::filter::RemovalRules;
use untext_core::walker::VisitPolicy;

/// Largest arity accepted for a custom removal rule.
const MAX_RULE_ARITY: usize = 16;

/// How shared forms are edited.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Visit {
    /// Edit each form once
    #[default]
    Once,
    /// Edit a form each time a resource table names it
    PerReference,
}

impl From<Visit> for VisitPolicy {
    fn from(visit: Visit) -> Self {
        match visit {
            Visit::Once => Self::Once,
            Visit::PerReference => Self::PerReference,
        }
    }
}

/// Remove all text from a PDF document.
#[derive(Parser, Debug)]
#[command(name = "remove-all-text")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// PDF file to read
    input: PathBuf,

    /// Path the edited PDF is written to
    output: PathBuf,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Store rewritten content streams without compression
    #[arg(long = "no-compress", action = ArgAction::SetTrue)]
    no_compress: bool,

    /// How often a form shared by several pages or forms is edited
    #[arg(long, value_enum, default_value = "once")]
    visit: Visit,

    /// Declare the `"` operator with one operand instead of three
    #[arg(long = "legacy-quote-arity", action = ArgAction::SetTrue)]
    legacy_quote_arity: bool,

    /// Also remove operator OP with ARITY operands (e.g. --rule Do=1)
    #[arg(long = "rule", value_name = "OP=ARITY", value_parser = parse_rule)]
    rules: Vec<(String, usize)>,
}

impl Args {
    fn edit_options(&self) -> EditOptions {
        let base = if self.legacy_quote_arity {
            RemovalRules::legacy()
        } else {
            RemovalRules::text_showing()
        };
        let rules = self
            .rules
            .iter()
            .fold(base, |rules, (op, arity)| rules.with(op, *arity));
        let compression = if self.no_compress {
            Compression::None
        } else {
            Compression::Flate
        };

        EditOptions::default()
            .with_compression(compression)
            .with_visit(self.visit.into())
            .with_rules(rules)
    }
}

/// Parse an `OP=ARITY` rule.
fn parse_rule(s: &str) -> std::result::Result<(String, usize), String> {
    let (op, arity) = s
        .split_once('=')
        .ok_or_else(|| format!("expected OP=ARITY, got {s:?}"))?;
    let op = op.trim();
    if op.is_empty() || op.bytes().any(|b| b.is_ascii_whitespace()) {
        return Err(format!("invalid operator name: {op:?}"));
    }
    let arity: usize = arity
        .trim()
        .parse()
        .map_err(|_| format!("invalid arity: {arity:?}"))?;
    if arity > MAX_RULE_ARITY {
        return Err(format!(
            "arity must be between 0 and {MAX_RULE_ARITY}, got {arity}"
        ));
    }
    Ok((op.to_string(), arity))
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<EditReport> {
    let options = args.edit_options();
    tracing::debug!(rules = ?options.rules.operators(), "removing operators");
    remove_text_from_file(&args.input, &args.output, &options)
        .with_context(|| format!("failed to remove text from {}", args.input.display()))
}

fn is_encrypted_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<PdfError>()
        .is_some_and(|e| matches!(e.root(), PdfError::Encrypted))
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(&args) {
        Ok(report) => {
            tracing::info!(output = %args.output.display(), "{report}");
            ExitCode::SUCCESS
        }
        Err(e) if is_encrypted_error(&e) => {
            eprintln!("Error: Encrypted documents are not supported.");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
