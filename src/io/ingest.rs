//! CSV ingest for the monthly HR metrics file.
//!
//! This module turns the flat `month,department,...` file into `MonthlyRecord`s.
//!
//! - **Whole-file parse**: every row is parsed before anything is returned, so a
//!   malformed row aborts the run before any output is written.
//! - **No schema policing** beyond what parsing enforces: missing columns and bad
//!   numbers surface as parse errors with the offending line.

use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{Month, MonthlyRecord};
use crate::error::AppError;

/// Column order used when writing the file.
pub const COLUMNS: [&str; 9] = [
    "month",
    "department",
    "headcount",
    "new_hires",
    "terminations",
    "open_positions",
    "time_to_fill_days",
    "offer_acceptance_rate",
    "turnover_rate",
];

/// A row exactly as it appears in the file, before the month is resolved.
#[derive(Debug, Deserialize)]
struct RawRow {
    month: String,
    department: String,
    headcount: u32,
    new_hires: u32,
    terminations: u32,
    open_positions: u32,
    time_to_fill_days: u32,
    offer_acceptance_rate: f64,
    turnover_rate: f64,
}

/// Load every record from `path`.
pub fn load_records(path: &Path) -> Result<Vec<MonthlyRecord>, AppError> {
    if !path.exists() {
        return Err(AppError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open metrics file '{}'", path.display()), e))?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| parse_error(path, 1, e))?
        .clone();
    reader.set_headers(normalize_headers(&headers));

    let mut records = Vec::new();
    for (idx, result) in reader.deserialize::<RawRow>().enumerate() {
        // +2: records start after the header, and lines are 1-based.
        let line = idx + 2;
        let raw = result.map_err(|e| parse_error(path, line, e))?;
        records.push(into_record(raw).map_err(|msg| parse_error(path, line, msg))?);
    }

    debug!(path = %path.display(), rows = records.len(), "parsed metrics file");
    Ok(records)
}

fn into_record(raw: RawRow) -> Result<MonthlyRecord, String> {
    let month: Month = raw.month.parse()?;
    Ok(MonthlyRecord {
        month,
        department: raw.department,
        headcount: raw.headcount,
        new_hires: raw.new_hires,
        terminations: raw.terminations,
        open_positions: raw.open_positions,
        time_to_fill_days: raw.time_to_fill_days,
        offer_acceptance_rate: raw.offer_acceptance_rate,
        turnover_rate: raw.turnover_rate,
    })
}

fn normalize_headers(headers: &StringRecord) -> StringRecord {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    headers
        .iter()
        .map(|name| name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
        .collect()
}

fn parse_error(path: &Path, line: usize, err: impl std::fmt::Display) -> AppError {
    AppError::Parse {
        path: path.to_path_buf(),
        line,
        message: err.to_string(),
    }
}
