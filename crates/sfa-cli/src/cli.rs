//! CLI argument definitions for sfa.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rate` | Rate every stock of one or all cap tiers |
//! | `tiers` | Show market-cap tier membership |
//! | `sectors` | Show sector statistics for a tier |
//! | `grade` | Per-metric grades for one stock |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson, table, csv) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors |
//! | `--config` | none | Rating config JSON (falls back to `SFA_CONFIG`) |
//! | `--verbose` | `false` | Debug logging on stderr |
//!
//! # Examples
//!
//! ```bash
//! sfa rate sfa_data.csv --raw --exchange NYSE --tier large --pretty
//! sfa tiers cleaned.csv --exchange NSE
//! sfa grade cleaned.csv --exchange NYSE --tier mid --code KO --format table
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Sector-relative fundamental stock ratings.
#[derive(Debug, Parser)]
#[command(
    name = "sfa",
    author,
    version,
    about = "Sector-relative fundamental stock ratings",
    long_about = "sfa partitions stocks into market-cap tiers and grades every tracked \
fundamental metric against sector peers, producing a letter grade per metric and an \
overall numeric rating per stock.\n\
\n\
Use 'sfa <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Path to a rating config JSON file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug detail to stderr (overrides SFA_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format for terminal display.
    Table,
    /// Single JSON object output.
    Json,
    /// Newline-delimited JSON.
    Ndjson,
    /// CSV of rated records (`rate` with `--tier` only).
    Csv,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rate every stock in one tier, or in all three.
    ///
    /// # Examples
    ///
    ///   sfa rate data.csv --exchange NYSE
    ///   sfa rate data.csv --raw --exchange NSE --tier small --format csv
    Rate(RateArgs),

    /// Show which stocks fall into which market-cap tier.
    Tiers(TiersArgs),

    /// Show per-sector percentile anchors and dispersion units for a tier.
    Sectors(SectorsArgs),

    /// Show per-metric grades and the overall rating of one stock.
    Grade(GradeArgs),
}

/// Input file and exchange shared by every command.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Fundamentals CSV file.
    pub input: PathBuf,

    /// Listing exchange; selects the market-cap threshold regime.
    #[arg(long)]
    pub exchange: String,

    /// Input is an uncleaned export: drop incomplete rows and convert
    /// market cap from raw units to billions.
    #[arg(long, default_value_t = false)]
    pub raw: bool,
}

#[derive(Debug, Args)]
pub struct RateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Only rate this tier (small, mid, large).
    #[arg(long)]
    pub tier: Option<String>,

    /// Keep rating the tier when a record fails; report failures as errors.
    #[arg(long, default_value_t = false)]
    pub isolate_failures: bool,
}

#[derive(Debug, Args)]
pub struct TiersArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct SectorsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Tier to compute statistics for.
    #[arg(long)]
    pub tier: String,
}

#[derive(Debug, Args)]
pub struct GradeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Tier whose peers the stock is graded against.
    #[arg(long)]
    pub tier: String,

    /// Stock code.
    #[arg(long)]
    pub code: String,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_rate_command() {
        let cli = Cli::try_parse_from([
            "sfa", "rate", "data.csv", "--exchange", "NYSE", "--tier", "large", "--raw",
            "--format", "csv",
        ])
        .expect("parses");

        assert_eq!(cli.format, OutputFormat::Csv);
        let Command::Rate(args) = cli.command else {
            panic!("expected rate command");
        };
        assert!(args.input.raw);
        assert_eq!(args.tier.as_deref(), Some("large"));
    }

    #[test]
    fn grade_requires_code() {
        let result = Cli::try_parse_from([
            "sfa", "grade", "data.csv", "--exchange", "NYSE", "--tier", "large",
        ]);
        assert!(result.is_err());
    }
}
