//! Reporting: aggregation of raw records and the narrative built on top of it.

pub mod aggregate;
pub mod format;

pub use aggregate::{
    Insights, MonthlyTable, aggregate_monthly, build_insights, department_snapshot, pct_change,
};
pub use format::{
    format_executive_summary, format_key_insights, format_run_summary, wrap_text,
};
