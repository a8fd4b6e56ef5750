//! File writers for the generated dataset, the text summary, and the metrics export.

use std::fs::{self, File};
use std::path::Path;

use serde::Serialize;

use crate::domain::{DepartmentSnapshot, MonthlyAggregate, MonthlyRecord};
use crate::error::AppError;
use crate::io::ingest::COLUMNS;

/// Write records in the same layout `load_records` reads.
///
/// Rates are written with fixed precision (offer acceptance 1 dp, turnover 2 dp)
/// so the file is byte-stable for a given set of records.
pub fn write_records_csv(path: &Path, records: &[MonthlyRecord]) -> Result<(), AppError> {
    ensure_parent_dir(path)?;
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create dataset '{}'", path.display()), e))?;
    let mut writer = csv::Writer::from_writer(file);

    let write_err = |e: csv::Error| AppError::io(format!("Failed to write dataset '{}'", path.display()), e.into());

    writer.write_record(COLUMNS).map_err(write_err)?;
    for r in records {
        writer
            .write_record([
                r.month.to_string(),
                r.department.clone(),
                r.headcount.to_string(),
                r.new_hires.to_string(),
                r.terminations.to_string(),
                r.open_positions.to_string(),
                r.time_to_fill_days.to_string(),
                format!("{:.1}", r.offer_acceptance_rate),
                format!("{:.2}", r.turnover_rate),
            ])
            .map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush dataset '{}'", path.display()), e))?;

    Ok(())
}

/// Write the executive summary followed by a newline.
pub fn write_summary_text(path: &Path, summary: &str) -> Result<(), AppError> {
    fs::write(path, format!("{summary}\n"))
        .map_err(|e| AppError::io(format!("Failed to write summary '{}'", path.display()), e))
}

#[derive(Serialize)]
struct MetricsExport<'a> {
    monthly: &'a [MonthlyAggregate],
    departments: &'a [DepartmentSnapshot],
}

/// Export the derived tables as pretty JSON (`null` for undefined deltas).
pub fn write_metrics_json(
    path: &Path,
    monthly: &[MonthlyAggregate],
    departments: &[DepartmentSnapshot],
) -> Result<(), AppError> {
    ensure_parent_dir(path)?;
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create metrics JSON '{}'", path.display()), e))?;

    serde_json::to_writer_pretty(file, &MetricsExport { monthly, departments })
        .map_err(|e| AppError::io(format!("Failed to write metrics JSON '{}'", path.display()), e.into()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
            .map_err(|e| AppError::io(format!("Failed to create directory '{}'", dir.display()), e)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Month;
    use crate::io::ingest::load_records;

    fn record(month: Month, department: &str, headcount: u32) -> MonthlyRecord {
        MonthlyRecord {
            month,
            department: department.to_string(),
            headcount,
            new_hires: 4,
            terminations: 1,
            open_positions: 6,
            time_to_fill_days: 33,
            offer_acceptance_rate: 81.0,
            turnover_rate: 1.5,
        }
    }

    #[test]
    fn written_dataset_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("metrics.csv");
        let records = vec![
            record(Month::new(2025, 2).unwrap(), "Engineering", 95),
            record(Month::new(2025, 2).unwrap(), "Customer Success", 37),
        ];

        write_records_csv(&path, &records).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(COLUMNS.join(",").as_str()));
        assert_eq!(lines.next(), Some("2025-02,Engineering,95,4,1,6,33,81.0,1.50"));

        assert_eq!(load_records(&path).unwrap(), records);
    }

    #[test]
    fn summary_text_ends_with_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.txt");
        write_summary_text(&path, "All good.").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "All good.\n");
    }

    #[test]
    fn metrics_json_uses_null_for_undefined_deltas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        let monthly = vec![MonthlyAggregate {
            month: Month::new(2025, 1).unwrap(),
            headcount: 100,
            new_hires: 5,
            terminations: 2,
            open_positions: 3,
            avg_time_to_fill: 30.0,
            avg_offer_acceptance: 80.0,
            avg_turnover_rate: 2.0,
            headcount_mom_pct: None,
            new_hires_mom_pct: None,
            turnover_mom_delta: None,
        }];

        write_metrics_json(&path, &monthly, &[]).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["monthly"][0]["month"], "2025-01");
        assert!(value["monthly"][0]["headcount_mom_pct"].is_null());
        assert_eq!(value["departments"].as_array().map(Vec::len), Some(0));
    }
}
