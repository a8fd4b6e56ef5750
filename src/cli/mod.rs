//! Command-line parsing for the HR metrics dashboard.
//!
//! Argument parsing lives here; dispatch and the pipelines live in `app`.
//! Every path and the seed can also come from the environment (or a `.env`
//! file), so scheduled runs need no flags.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Month;

pub const DEFAULT_DATASET: &str = "data/hr_metrics_monthly.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hrdash", version, about = "Monthly HR metrics charts, summary, and executive deck")]
pub struct Cli {
    /// Log debug details to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a reproducible mock dataset.
    Generate(GenerateArgs),
    /// Build charts, the executive summary, and the slide deck from a dataset.
    Report(ReportArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    /// Monthly metrics CSV.
    #[arg(short, long, env = "HR_METRICS_INPUT", default_value = DEFAULT_DATASET)]
    pub input: PathBuf,

    /// Directory for charts, the deck, and the summary (created if absent).
    #[arg(short, long, env = "HR_REPORT_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// TrueType font for chart text. Defaults to a well-known system font.
    #[arg(long, env = "HR_CHART_FONT", value_name = "TTF")]
    pub font: Option<PathBuf>,

    /// Also export the monthly table and department snapshot as JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Where to write the dataset.
    #[arg(short, long, env = "HR_MOCK_OUTPUT", default_value = DEFAULT_DATASET)]
    pub output: PathBuf,

    /// Random seed; the same seed writes the same file.
    #[arg(long, env = "HR_MOCK_SEED", default_value_t = 42)]
    pub seed: u64,

    /// First month (YYYY-MM).
    #[arg(long, default_value = "2025-02")]
    pub start_month: Month,

    /// Number of consecutive months.
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u16).range(1..))]
    pub months: u16,
}
