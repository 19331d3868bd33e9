//! apidiff command-line interface.
//!
//! Loads two API documents, compares them and prints the change report in
//! the requested format. The exit code tells scripts what was found.

use anyhow::{Context, Result};
use apidiff::{
    compare_documents, create_formatter, parse_file, CompareConfig, ComparisonSummary,
    OutputFormat,
};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// apidiff - API surface diff tool
///
/// Compares two serialized versions of a library's public API and reports
/// added, removed and modified types and members, flagging breaking changes.
#[derive(Parser)]
#[command(name = "apidiff")]
#[command(version)]
#[command(about = "Breaking-change aware API surface diff", long_about = None)]
struct Cli {
    /// API document of the old version
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// API document of the new version
    #[arg(value_name = "TARGET")]
    target: PathBuf,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormatArg,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Report title
    #[arg(long, default_value = apidiff::DEFAULT_TITLE)]
    title: String,

    /// Regex for new types that should not be reported (repeatable)
    #[arg(long = "ignore-new", value_name = "REGEX")]
    ignore_new: Vec<String>,

    /// Regex for added members that should not be reported (repeatable)
    #[arg(long = "ignore-added", value_name = "REGEX")]
    ignore_added: Vec<String>,

    /// Regex for removed types and members that should not be reported (repeatable)
    #[arg(long = "ignore-removed", value_name = "REGEX")]
    ignore_removed: Vec<String>,

    /// Only report breaking changes
    #[arg(long)]
    ignore_nonbreaking: bool,

    /// Exit with code 3 when breaking changes are found
    #[arg(long)]
    fail_on_breaking: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (no summary line, errors only)
    #[arg(short, long)]
    quiet: bool,
}

/// Output format argument for clap
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormatArg {
    /// Plain text (no colors)
    Text,
    /// Colored terminal output
    Terminal,
    Html,
    Markdown,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Text => OutputFormat::Text,
            OutputFormatArg::Terminal => OutputFormat::Terminal,
            OutputFormatArg::Html => OutputFormat::Html,
            OutputFormatArg::Markdown => OutputFormat::Markdown,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(2);
        }
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    let source = parse_file(&cli.source)
        .with_context(|| format!("Failed to load source document: {}", cli.source.display()))?;
    let target = parse_file(&cli.target)
        .with_context(|| format!("Failed to load target document: {}", cli.target.display()))?;

    let config = CompareConfig::from_patterns(
        &cli.ignore_new,
        &cli.ignore_added,
        &cli.ignore_removed,
        cli.ignore_nonbreaking,
    )?;

    let mut formatter = create_formatter(cli.format.into());
    let summary = compare_documents(
        &cli.title,
        &source,
        &target,
        &config,
        &mut [formatter.as_mut()],
    )
    .context("Failed to compare documents")?;
    let report = formatter.finish().context("Failed to render report")?;

    match &cli.output {
        Some(path) => fs::write(path, &report)
            .with_context(|| format!("Failed to write report: {}", path.display()))?,
        None => print!("{}", report),
    }

    if !cli.quiet {
        eprintln!("{}", summary_line(&summary));
    }

    Ok(exit_code(&summary, cli.fail_on_breaking))
}

fn summary_line(summary: &ComparisonSummary) -> String {
    format!(
        "Summary: {} added, {} removed, {} modified ({} breaking)",
        summary.added, summary.removed, summary.modified, summary.breaking
    )
}

fn exit_code(summary: &ComparisonSummary, fail_on_breaking: bool) -> i32 {
    if fail_on_breaking && summary.has_breaking_changes() {
        3
    } else if summary.has_changes() {
        1
    } else {
        0
    }
}
