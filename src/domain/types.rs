//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during aggregation
//! - exported to CSV/JSON
//! - rendered into charts and slides without further conversion

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Serialize, Serializer};

/// A calendar month, stored as the first day of that month.
///
/// Input files carry months as `YYYY-MM`; we append a synthetic `-01` so the
/// value parses as a date and sorts chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(NaiveDate);

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// Calendar month number (1 = January).
    pub fn number(&self) -> u32 {
        self.0.month()
    }

    pub fn next(&self) -> Option<Self> {
        self.0.checked_add_months(Months::new(1)).map(Self)
    }

    /// Short human label, e.g. `Jan 2026`.
    pub fn label(&self) -> String {
        self.0.format("%b %Y").to_string()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| format!("Invalid month '{s}'. Expected YYYY-MM."))
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One row of the input file: a department's figures for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRecord {
    pub month: Month,
    pub department: String,
    pub headcount: u32,
    pub new_hires: u32,
    pub terminations: u32,
    pub open_positions: u32,
    pub time_to_fill_days: u32,
    /// Percent, 0-100.
    pub offer_acceptance_rate: f64,
    /// Percent, 0-100.
    pub turnover_rate: f64,
}

/// Company-wide figures for one month.
///
/// Counts are summed across departments; rates and time-to-fill are plain
/// (unweighted) means of the department rows. The period-over-period fields are
/// `None` for the first month and whenever the prior value is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAggregate {
    pub month: Month,
    pub headcount: u64,
    pub new_hires: u64,
    pub terminations: u64,
    pub open_positions: u64,
    pub avg_time_to_fill: f64,
    pub avg_offer_acceptance: f64,
    pub avg_turnover_rate: f64,
    pub headcount_mom_pct: Option<f64>,
    pub new_hires_mom_pct: Option<f64>,
    /// Absolute change in percentage points.
    pub turnover_mom_delta: Option<f64>,
}

/// Latest-month figures for a single department.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentSnapshot {
    pub department: String,
    pub headcount: u64,
    pub turnover_rate: f64,
    pub time_to_fill_days: f64,
}

/// Resolved settings for `hrdash report`.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// TrueType font used for chart text; `None` searches well-known system paths.
    pub font: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// Resolved settings for `hrdash generate`.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub output: PathBuf,
    pub seed: u64,
    pub start_month: Month,
    pub months: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_parses_and_orders_chronologically() {
        let dec: Month = "2025-12".parse().unwrap();
        let jan: Month = " 2026-01 ".parse().unwrap();
        assert!(dec < jan);
        assert_eq!(dec.next(), Some(jan));
        assert_eq!(jan.to_string(), "2026-01");
        assert_eq!(jan.label(), "Jan 2026");
        assert_eq!(jan.number(), 1);
    }

    #[test]
    fn month_rejects_malformed_values() {
        assert!("2025-13".parse::<Month>().is_err());
        assert!("2025/01".parse::<Month>().is_err());
        assert!("".parse::<Month>().is_err());
    }

    #[test]
    fn month_serializes_as_year_month() {
        let m = Month::new(2025, 2).unwrap();
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"2025-02\"");
    }
}
