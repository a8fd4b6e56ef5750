//! Group-by aggregation: monthly totals and the latest-month department snapshot.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{DepartmentSnapshot, Month, MonthlyAggregate, MonthlyRecord};
use crate::error::AppError;

/// Monthly aggregates in ascending month order.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTable {
    rows: Vec<MonthlyAggregate>,
}

impl MonthlyTable {
    pub fn rows(&self) -> &[MonthlyAggregate] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MonthlyAggregate> {
        self.rows.iter()
    }

    /// The most recent month.
    pub fn latest(&self) -> Result<&MonthlyAggregate, AppError> {
        self.rows.last().ok_or(AppError::InsufficientPeriods {
            needed: 1,
            found: 0,
        })
    }

    /// The month immediately before [`latest`](Self::latest).
    pub fn prior(&self) -> Result<&MonthlyAggregate, AppError> {
        let found = self.rows.len();
        if found < 2 {
            return Err(AppError::InsufficientPeriods { needed: 2, found });
        }
        Ok(&self.rows[found - 2])
    }
}

/// The derived tables every output is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    pub monthly: MonthlyTable,
    /// Latest-month departments, headcount descending.
    pub departments: Vec<DepartmentSnapshot>,
}

impl Insights {
    pub fn latest(&self) -> Result<&MonthlyAggregate, AppError> {
        self.monthly.latest()
    }

    pub fn prior(&self) -> Result<&MonthlyAggregate, AppError> {
        self.monthly.prior()
    }

    /// Department with the highest turnover rate (ties: department name ascending).
    pub fn highest_turnover(&self) -> Option<&DepartmentSnapshot> {
        self.departments.iter().min_by(|a, b| {
            b.turnover_rate
                .total_cmp(&a.turnover_rate)
                .then_with(|| a.department.cmp(&b.department))
        })
    }

    /// Department with the shortest time-to-fill (ties: department name ascending).
    pub fn fastest_time_to_fill(&self) -> Option<&DepartmentSnapshot> {
        self.departments.iter().min_by(|a, b| {
            a.time_to_fill_days
                .total_cmp(&b.time_to_fill_days)
                .then_with(|| a.department.cmp(&b.department))
        })
    }

    /// Department with the smallest headcount (ties: department name ascending).
    pub fn smallest_department(&self) -> Option<&DepartmentSnapshot> {
        self.departments.iter().min_by(|a, b| {
            a.headcount
                .cmp(&b.headcount)
                .then_with(|| a.department.cmp(&b.department))
        })
    }
}

/// Aggregate raw records into the monthly table and latest-month department snapshot.
///
/// Requires at least two distinct months so the latest month has a prior period.
pub fn build_insights(records: &[MonthlyRecord]) -> Result<Insights, AppError> {
    let monthly = aggregate_monthly(records);
    let latest_month = monthly.latest()?.month;
    monthly.prior()?;

    let departments = department_snapshot(records, latest_month);
    debug!(
        months = monthly.len(),
        departments = departments.len(),
        latest = %latest_month,
        "aggregated records"
    );

    Ok(Insights { monthly, departments })
}

/// Sum/average per month, ascending, with period-over-period changes.
pub fn aggregate_monthly(records: &[MonthlyRecord]) -> MonthlyTable {
    let mut by_month: BTreeMap<Month, Vec<&MonthlyRecord>> = BTreeMap::new();
    for r in records {
        by_month.entry(r.month).or_default().push(r);
    }

    let mut rows: Vec<MonthlyAggregate> = Vec::with_capacity(by_month.len());
    for (month, group) in by_month {
        let n = group.len() as f64;
        let mut row = MonthlyAggregate {
            month,
            headcount: group.iter().map(|r| u64::from(r.headcount)).sum(),
            new_hires: group.iter().map(|r| u64::from(r.new_hires)).sum(),
            terminations: group.iter().map(|r| u64::from(r.terminations)).sum(),
            open_positions: group.iter().map(|r| u64::from(r.open_positions)).sum(),
            avg_time_to_fill: group.iter().map(|r| f64::from(r.time_to_fill_days)).sum::<f64>() / n,
            avg_offer_acceptance: group.iter().map(|r| r.offer_acceptance_rate).sum::<f64>() / n,
            avg_turnover_rate: group.iter().map(|r| r.turnover_rate).sum::<f64>() / n,
            headcount_mom_pct: None,
            new_hires_mom_pct: None,
            turnover_mom_delta: None,
        };

        if let Some(prev) = rows.last() {
            row.headcount_mom_pct = pct_change(prev.headcount as f64, row.headcount as f64);
            row.new_hires_mom_pct = pct_change(prev.new_hires as f64, row.new_hires as f64);
            row.turnover_mom_delta = Some(row.avg_turnover_rate - prev.avg_turnover_rate);
        }
        rows.push(row);
    }

    MonthlyTable { rows }
}

/// Per-department figures for `month`, headcount descending (ties: name ascending).
pub fn department_snapshot(records: &[MonthlyRecord], month: Month) -> Vec<DepartmentSnapshot> {
    let mut by_dept: BTreeMap<&str, Vec<&MonthlyRecord>> = BTreeMap::new();
    for r in records.iter().filter(|r| r.month == month) {
        by_dept.entry(r.department.as_str()).or_default().push(r);
    }

    let mut out: Vec<DepartmentSnapshot> = by_dept
        .into_iter()
        .map(|(department, group)| {
            let n = group.len() as f64;
            DepartmentSnapshot {
                department: department.to_string(),
                headcount: group.iter().map(|r| u64::from(r.headcount)).sum(),
                turnover_rate: group.iter().map(|r| r.turnover_rate).sum::<f64>() / n,
                time_to_fill_days: group.iter().map(|r| f64::from(r.time_to_fill_days)).sum::<f64>() / n,
            }
        })
        .collect();

    out.sort_by(|a, b| match b.headcount.cmp(&a.headcount) {
        Ordering::Equal => a.department.cmp(&b.department),
        other => other,
    });
    out
}

/// `(curr - prev) / prev * 100`, or `None` when the prior period is zero.
pub fn pct_change(prev: f64, curr: f64) -> Option<f64> {
    if prev == 0.0 {
        return None;
    }
    Some((curr - prev) / prev * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(month: &str, department: &str, headcount: u32, turnover: f64, ttf: u32) -> MonthlyRecord {
        MonthlyRecord {
            month: month.parse().unwrap(),
            department: department.to_string(),
            headcount,
            new_hires: 2,
            terminations: 1,
            open_positions: 3,
            time_to_fill_days: ttf,
            offer_acceptance_rate: 80.0,
            turnover_rate: turnover,
        }
    }

    fn sample() -> Vec<MonthlyRecord> {
        vec![
            rec("2025-03", "Sales", 60, 1.9, 34),
            rec("2025-01", "Sales", 58, 1.7, 35),
            rec("2025-02", "Engineering", 96, 1.1, 47),
            rec("2025-01", "Engineering", 95, 1.0, 46),
            rec("2025-03", "Engineering", 98, 1.2, 45),
            rec("2025-02", "Sales", 59, 2.1, 33),
            rec("2025-03", "HR", 18, 1.9, 29),
        ]
    }

    #[test]
    fn monthly_rows_are_distinct_and_ascending() {
        let table = aggregate_monthly(&sample());
        assert_eq!(table.len(), 3);
        assert!(table.rows().windows(2).all(|w| w[0].month < w[1].month));
        assert!(table.rows()[0].headcount_mom_pct.is_none());
        assert!(table.rows()[0].turnover_mom_delta.is_none());
    }

    #[test]
    fn monthly_headcount_is_department_sum() {
        let records = sample();
        let table = aggregate_monthly(&records);
        for row in table.iter() {
            let raw: u64 = records
                .iter()
                .filter(|r| r.month == row.month)
                .map(|r| u64::from(r.headcount))
                .sum();
            assert_eq!(row.headcount, raw);
        }
        // Means are unweighted across department rows.
        let march = &table.rows()[2];
        assert!((march.avg_turnover_rate - (1.9 + 1.2 + 1.9) / 3.0).abs() < 1e-12);
        assert!((march.avg_time_to_fill - (34.0 + 45.0 + 29.0) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn headcount_growth_of_ten_percent_is_exact() {
        let records = vec![rec("2025-01", "Eng", 100, 2.0, 30), rec("2025-02", "Eng", 110, 2.5, 28)];
        let table = aggregate_monthly(&records);
        assert_eq!(table.rows()[1].headcount_mom_pct, Some(10.0));
        assert_eq!(table.rows()[1].turnover_mom_delta, Some(0.5));
    }

    #[test]
    fn zero_prior_period_is_undefined() {
        assert_eq!(pct_change(0.0, 5.0), None);
        assert_eq!(pct_change(0.0, 0.0), None);
        assert_eq!(pct_change(4.0, 2.0), Some(-50.0));
    }

    #[test]
    fn snapshot_covers_latest_month_sorted_by_headcount() {
        let insights = build_insights(&sample()).unwrap();
        let names: Vec<&str> = insights.departments.iter().map(|d| d.department.as_str()).collect();
        assert_eq!(names, ["Engineering", "Sales", "HR"]);
        assert_eq!(insights.departments[0].headcount, 98);
        assert_eq!(insights.latest().unwrap().month.to_string(), "2025-03");
        assert_eq!(insights.prior().unwrap().month.to_string(), "2025-02");
    }

    #[test]
    fn superlative_ties_break_by_department_name() {
        let insights = build_insights(&sample()).unwrap();
        // Sales and HR share 1.9% turnover in March.
        assert_eq!(insights.highest_turnover().unwrap().department, "HR");
        assert_eq!(insights.fastest_time_to_fill().unwrap().department, "HR");
        assert_eq!(insights.smallest_department().unwrap().department, "HR");

        let tied = vec![
            rec("2025-01", "Ops", 10, 1.0, 30),
            rec("2025-02", "Ops", 10, 1.0, 30),
            rec("2025-02", "Finance", 10, 1.0, 30),
        ];
        let insights = build_insights(&tied).unwrap();
        let names: Vec<&str> = insights.departments.iter().map(|d| d.department.as_str()).collect();
        assert_eq!(names, ["Finance", "Ops"]);
        assert_eq!(insights.highest_turnover().unwrap().department, "Finance");
        assert_eq!(insights.smallest_department().unwrap().department, "Finance");
    }

    #[test]
    fn single_month_has_no_prior_period() {
        let records = vec![rec("2025-01", "Eng", 100, 2.0, 30)];
        match build_insights(&records).unwrap_err() {
            AppError::InsufficientPeriods { needed, found } => {
                assert_eq!(needed, 2);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let empty = aggregate_monthly(&[]);
        assert!(empty.is_empty());
        assert!(matches!(empty.latest(), Err(AppError::InsufficientPeriods { found: 0, .. })));
    }
}
