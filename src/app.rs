//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - runs the generator or the report pipeline
//! - prints what was produced

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, GenerateArgs, ReportArgs};
use crate::domain::{GenerateConfig, ReportConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `hrdash` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; flags and real env vars still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Generate(args) => handle_generate(&args),
        Command::Report(args) => handle_report(&args),
    }
}

/// Log to stderr so stdout carries only the run summary.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_generate(args: &GenerateArgs) -> Result<(), AppError> {
    let config = generate_config_from_args(args);
    let run = pipeline::run_generate(&config)?;

    println!("Generated mock dataset: {}", run.path.display());
    println!(
        "Rows: {} | Months: {} | Departments: {}",
        run.rows, run.months, run.departments
    );
    Ok(())
}

fn handle_report(args: &ReportArgs) -> Result<(), AppError> {
    let config = report_config_from_args(args);
    let run = pipeline::run_report(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.summary, &run.artifacts)
    );
    Ok(())
}

pub fn report_config_from_args(args: &ReportArgs) -> ReportConfig {
    ReportConfig {
        input: args.input.clone(),
        output_dir: args.output_dir.clone(),
        font: args.font.clone(),
        export_json: args.export_json.clone(),
    }
}

pub fn generate_config_from_args(args: &GenerateArgs) -> GenerateConfig {
    GenerateConfig {
        output: args.output.clone(),
        seed: args.seed,
        start_month: args.start_month,
        months: usize::from(args.months),
    }
}
