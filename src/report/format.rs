//! Narrative text: the executive summary, the slide bullets, and terminal output.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - wording changes are localized

use std::path::PathBuf;

use crate::domain::{DepartmentSnapshot, Month};
use crate::error::AppError;
use crate::report::Insights;

/// Shown wherever a period-over-period change is undefined.
pub const NOT_AVAILABLE: &str = "N/A";

/// Time-to-fill threshold the recommendations call out.
const TIME_TO_FILL_FOCUS_DAYS: u32 = 40;

const RETENTION_RECOMMENDATION: &str = "Recommendation: Launch targeted retention interventions for \
high-turnover departments and monitor offer acceptance weekly to reduce backfill lag.";

/// The one-paragraph executive summary for the latest month.
pub fn format_executive_summary(insights: &Insights) -> Result<String, AppError> {
    let latest = insights.latest()?;
    let top_turnover = required(insights.highest_turnover(), latest.month)?;
    let best_ttf = required(insights.fastest_time_to_fill(), latest.month)?;

    Ok(format!(
        "As of {}, total headcount is {} ({} MoM), with {} hires and {} terminations. \
         Average turnover is {:.2}% ({} MoM), offer acceptance is {:.1}%, and time-to-fill \
         averages {:.1} days. Highest turnover is in {} ({:.2}%), while fastest hiring cycle \
         is in {} ({:.1} days).",
        latest.month.label(),
        latest.headcount,
        fmt_signed_pct(latest.headcount_mom_pct),
        latest.new_hires,
        latest.terminations,
        latest.avg_turnover_rate,
        fmt_signed_points(latest.turnover_mom_delta),
        latest.avg_offer_acceptance,
        latest.avg_time_to_fill,
        top_turnover.department,
        top_turnover.turnover_rate,
        best_ttf.department,
        best_ttf.time_to_fill_days,
    ))
}

/// The five bullets on the insights slide.
pub fn format_key_insights(insights: &Insights) -> Result<Vec<String>, AppError> {
    let latest = insights.latest()?;
    let risk = required(insights.highest_turnover(), latest.month)?;
    let smallest = required(insights.smallest_department(), latest.month)?;

    Ok(vec![
        format!(
            "Total headcount reached {}, with momentum of {} month-over-month.",
            latest.headcount,
            fmt_signed_pct(latest.headcount_mom_pct)
        ),
        format!(
            "Average turnover is {:.2}%; highest risk area is {} ({:.2}%).",
            latest.avg_turnover_rate, risk.department, risk.turnover_rate
        ),
        format!(
            "Average time-to-fill is {:.1} days; focus pipeline acceleration for teams above {} days.",
            latest.avg_time_to_fill, TIME_TO_FILL_FOCUS_DAYS
        ),
        format!(
            "Open positions currently total {}; prioritize hiring plans for {} to avoid service bottlenecks.",
            latest.open_positions, smallest.department
        ),
        RETENTION_RECOMMENDATION.to_string(),
    ])
}

/// Terminal output for a finished report run.
pub fn format_run_summary(summary: &str, artifacts: &[PathBuf]) -> String {
    let mut out = String::new();
    out.push_str("Executive Summary:\n");
    out.push_str(summary);
    out.push_str("\n\nGenerated:\n");
    for path in artifacts {
        out.push_str(&format!("- {}\n", path.display()));
    }
    out
}

/// Greedy word wrap at `width` characters. Words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_chars = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(width) {
            let needed = if line_chars == 0 { piece.len() } else { line_chars + 1 + piece.len() };
            if needed > width && line_chars > 0 {
                lines.push(std::mem::take(&mut line));
                line_chars = 0;
            }
            if line_chars > 0 {
                line.push(' ');
                line_chars += 1;
            }
            line.extend(piece);
            line_chars += piece.len();
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn fmt_signed_pct(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() => format!("{v:+.1}%"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn fmt_signed_points(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() => format!("{v:+.2} pts"),
        _ => format!("{NOT_AVAILABLE} pts"),
    }
}

fn required(dept: Option<&DepartmentSnapshot>, month: Month) -> Result<&DepartmentSnapshot, AppError> {
    dept.ok_or(AppError::EmptySnapshot { month })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MonthlyRecord;
    use crate::report::build_insights;

    fn rec(month: &str, department: &str, headcount: u32, hires: u32, turnover: f64, ttf: u32) -> MonthlyRecord {
        MonthlyRecord {
            month: month.parse().unwrap(),
            department: department.to_string(),
            headcount,
            new_hires: hires,
            terminations: 3,
            open_positions: 4,
            time_to_fill_days: ttf,
            offer_acceptance_rate: 82.0,
            turnover_rate: turnover,
        }
    }

    #[test]
    fn summary_interpolates_latest_month() {
        let records = vec![
            rec("2025-01", "Eng", 100, 5, 2.0, 30),
            rec("2025-02", "Eng", 110, 8, 2.5, 28),
        ];
        let insights = build_insights(&records).unwrap();
        let summary = format_executive_summary(&insights).unwrap();

        assert_eq!(
            summary,
            "As of Feb 2025, total headcount is 110 (+10.0% MoM), with 8 hires and 3 terminations. \
             Average turnover is 2.50% (+0.50 pts MoM), offer acceptance is 82.0%, and time-to-fill \
             averages 28.0 days. Highest turnover is in Eng (2.50%), while fastest hiring cycle \
             is in Eng (28.0 days)."
        );
    }

    #[test]
    fn zero_prior_renders_not_available() {
        let records = vec![
            rec("2025-01", "Eng", 0, 0, 2.0, 30),
            rec("2025-02", "Eng", 12, 3, 1.0, 28),
        ];
        let insights = build_insights(&records).unwrap();
        let summary = format_executive_summary(&insights).unwrap();
        assert!(summary.contains("total headcount is 12 (N/A MoM)"));
        assert!(summary.contains("(-1.00 pts MoM)"));

        let bullets = format_key_insights(&insights).unwrap();
        assert!(bullets[0].contains("momentum of N/A month-over-month"));
    }

    #[test]
    fn key_insights_name_risk_and_smallest_departments() {
        let records = vec![
            rec("2025-01", "Sales", 60, 2, 1.8, 34),
            rec("2025-01", "HR", 18, 1, 1.0, 29),
            rec("2025-02", "Sales", 62, 3, 2.2, 33),
            rec("2025-02", "HR", 18, 1, 0.9, 29),
        ];
        let insights = build_insights(&records).unwrap();
        let bullets = format_key_insights(&insights).unwrap();

        assert_eq!(bullets.len(), 5);
        assert!(bullets[1].contains("highest risk area is Sales (2.20%)"));
        assert!(bullets[2].contains("teams above 40 days"));
        assert!(bullets[3].starts_with("Open positions currently total 8;"));
        assert!(bullets[3].contains("hiring plans for HR"));
        assert!(bullets[4].starts_with("Recommendation:"));
    }

    #[test]
    fn wrap_respects_width() {
        let text = "alpha beta gamma delta epsilon";
        assert_eq!(wrap_text(text, 11), ["alpha beta", "gamma delta", "epsilon"]);
        assert_eq!(wrap_text("oversizedword ok", 4), ["over", "size", "dwor", "d ok"]);
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn wrap_counts_characters_not_bytes() {
        let text = format!("{} x", "é".repeat(70));
        assert_eq!(wrap_text(&text, 120), [text.clone()]);

        let lines = wrap_text(&"é".repeat(130), 120);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].chars().count(), 120);
        assert_eq!(lines[1].chars().count(), 10);
    }

    #[test]
    fn empty_department_snapshot_is_named() {
        let records = vec![
            rec("2025-01", "Eng", 100, 5, 2.0, 30),
            rec("2025-02", "Eng", 110, 8, 2.5, 28),
        ];
        let insights = Insights {
            departments: Vec::new(),
            ..build_insights(&records).unwrap()
        };

        let err = format_executive_summary(&insights).unwrap_err();
        assert!(matches!(err, AppError::EmptySnapshot { .. }));
        assert_eq!(err.to_string(), "No department rows for 2025-02.");
        assert_eq!(err.exit_code(), 3);
        assert!(matches!(format_key_insights(&insights), Err(AppError::EmptySnapshot { .. })));
    }

    #[test]
    fn run_summary_lists_artifacts() {
        let out = format_run_summary("Done.", &[PathBuf::from("output/a.png")]);
        assert_eq!(out, "Executive Summary:\nDone.\n\nGenerated:\n- output/a.png\n");
    }
}
