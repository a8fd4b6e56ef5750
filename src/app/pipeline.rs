//! The two end-to-end workflows behind the CLI.
//!
//! Report: load -> aggregate -> narrative -> charts -> deck -> summary text.
//! Generate: seed -> sample -> CSV.
//!
//! Input is fully loaded and summarized before the output directory is touched,
//! so a bad input file leaves no partial outputs behind.

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::data::{DEPARTMENTS, generate_records};
use crate::deck::{PRESENTATION_FILE, build_deck, write_pptx};
use crate::domain::{GenerateConfig, ReportConfig};
use crate::error::AppError;
use crate::io::{load_records, write_metrics_json, write_records_csv, write_summary_text};
use crate::report::{Insights, build_insights, format_executive_summary, format_key_insights};

pub const SUMMARY_FILE: &str = "executive_summary.txt";

/// Everything a report run produced.
#[derive(Debug, Clone)]
pub struct ReportOutput {
    pub summary: String,
    pub insights: Insights,
    /// Written files, in the order they were produced.
    pub artifacts: Vec<PathBuf>,
}

/// What the generator wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOutput {
    pub path: PathBuf,
    pub rows: usize,
    pub months: usize,
    pub departments: usize,
}

pub fn run_report(config: &ReportConfig) -> Result<ReportOutput, AppError> {
    // 1) Load and summarize.
    let records = load_records(&config.input)?;
    info!(path = %config.input.display(), rows = records.len(), "loaded metrics");

    let insights = build_insights(&records)?;
    let summary = format_executive_summary(&insights)?;
    let key_insights = format_key_insights(&insights)?;

    // 2) Outputs.
    let out_dir = &config.output_dir;
    fs::create_dir_all(out_dir)
        .map_err(|e| AppError::io(format!("Failed to create output directory '{}'", out_dir.display()), e))?;

    let charts = crate::plot::render_charts(&insights, out_dir, config.font.as_deref())?;

    let deck = build_deck(&summary, &key_insights, &charts, Local::now());
    let deck_path = out_dir.join(PRESENTATION_FILE);
    write_pptx(&deck, &deck_path)?;

    let summary_path = out_dir.join(SUMMARY_FILE);
    write_summary_text(&summary_path, &summary)?;

    let mut artifacts = vec![
        charts.headcount.path,
        charts.hiring.path,
        charts.department.path,
        deck_path,
        summary_path,
    ];

    if let Some(path) = &config.export_json {
        write_metrics_json(path, insights.monthly.rows(), &insights.departments)?;
        artifacts.push(path.clone());
    }

    let latest = insights.latest()?;
    let prior = insights.prior()?;
    info!(
        prior = %prior.month,
        latest = %latest.month,
        headcount = latest.headcount,
        "report complete"
    );

    Ok(ReportOutput {
        summary,
        insights,
        artifacts,
    })
}

pub fn run_generate(config: &GenerateConfig) -> Result<GenerateOutput, AppError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let records = generate_records(&mut rng, config)?;
    write_records_csv(&config.output, &records)?;

    info!(
        path = %config.output.display(),
        seed = config.seed,
        rows = records.len(),
        "wrote mock dataset"
    );

    Ok(GenerateOutput {
        path: config.output.clone(),
        rows: records.len(),
        months: config.months,
        departments: DEPARTMENTS.len(),
    })
}
