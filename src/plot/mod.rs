//! Chart rendering.
//!
//! - PNG chart renderers (`charts`)
//! - runtime font registration for chart text (`font`)

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::AppError;
use crate::report::Insights;

pub mod charts;
pub mod font;

pub use charts::{
    DEPARTMENT_CHART_SIZE, LINE_CHART_SIZE, render_department_chart, render_headcount_chart,
    render_hiring_chart,
};
pub use font::ensure_chart_font;

pub const HEADCOUNT_CHART_FILE: &str = "headcount_trend.png";
pub const HIRING_CHART_FILE: &str = "hiring_turnover_trend.png";
pub const DEPARTMENT_CHART_FILE: &str = "department_breakdown.png";

/// A rendered image and its pixel size (needed to place it on a slide).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    pub path: PathBuf,
    pub width_px: u32,
    pub height_px: u32,
}

impl ChartImage {
    fn new(path: PathBuf, (width_px, height_px): (u32, u32)) -> Self {
        Self {
            path,
            width_px,
            height_px,
        }
    }
}

/// The three report charts.
#[derive(Debug, Clone)]
pub struct ChartSet {
    pub headcount: ChartImage,
    pub hiring: ChartImage,
    pub department: ChartImage,
}

/// Render every chart into `out_dir` at its fixed file name.
pub fn render_charts(insights: &Insights, out_dir: &Path, font: Option<&Path>) -> Result<ChartSet, AppError> {
    ensure_chart_font(font)?;

    let charts = ChartSet {
        headcount: ChartImage::new(out_dir.join(HEADCOUNT_CHART_FILE), LINE_CHART_SIZE),
        hiring: ChartImage::new(out_dir.join(HIRING_CHART_FILE), LINE_CHART_SIZE),
        department: ChartImage::new(out_dir.join(DEPARTMENT_CHART_FILE), DEPARTMENT_CHART_SIZE),
    };

    render_headcount_chart(&insights.monthly, &charts.headcount.path)?;
    render_hiring_chart(&insights.monthly, &charts.hiring.path)?;
    render_department_chart(&insights.departments, &charts.department.path)?;

    info!(dir = %out_dir.display(), "rendered charts");
    Ok(charts)
}
