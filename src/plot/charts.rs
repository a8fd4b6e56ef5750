//! Plotters-powered PNG charts.
//!
//! Each renderer is a pure function from a derived table to an image file. The
//! styling is fixed: one palette, one font family, one resolution per chart.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::domain::{DepartmentSnapshot, MonthlyAggregate};
use crate::error::AppError;
use crate::plot::font::CHART_FONT_FAMILY as FONT;
use crate::report::MonthlyTable;

/// Pixel size of the two month-axis charts.
pub const LINE_CHART_SIZE: (u32, u32) = (1600, 800);
/// Pixel size of the two-panel department chart.
pub const DEPARTMENT_CHART_SIZE: (u32, u32) = (1920, 800);

const HEADCOUNT_COLOR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
const HIRES_COLOR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
const TURNOVER_COLOR: RGBColor = RGBColor(0xd6, 0x27, 0x28);
const DEPT_HEADCOUNT_COLOR: RGBColor = RGBColor(0x2c, 0xa0, 0x2c);
const DEPT_TURNOVER_COLOR: RGBColor = RGBColor(0xff, 0x7f, 0x0e);

type DrawResult = Result<(), Box<dyn std::error::Error>>;

/// Total headcount per month as a line with point markers.
pub fn render_headcount_chart(monthly: &MonthlyTable, path: &Path) -> Result<(), AppError> {
    draw_headcount(monthly, path).map_err(|e| AppError::render("headcount", path, e))
}

/// New hires (left axis) against average turnover rate (right axis).
pub fn render_hiring_chart(monthly: &MonthlyTable, path: &Path) -> Result<(), AppError> {
    draw_hiring(monthly, path).map_err(|e| AppError::render("hiring", path, e))
}

/// Side-by-side bars of department headcount and turnover, in snapshot order.
pub fn render_department_chart(departments: &[DepartmentSnapshot], path: &Path) -> Result<(), AppError> {
    draw_departments(departments, path).map_err(|e| AppError::render("department", path, e))
}

fn draw_headcount(monthly: &MonthlyTable, path: &Path) -> DrawResult {
    let labels = month_labels(monthly);
    let points = month_series(monthly, |m| m.headcount as f64);

    let root = BitMapBackend::new(path, LINE_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Total Headcount Trend", (FONT, 40))
        .margin(30)
        .x_label_area_size(70)
        .y_label_area_size(100)
        .build_cartesian_2d(month_axis(labels.len()), padded_range(&points))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .bold_line_style(BLACK.mix(0.12))
        .light_line_style(WHITE)
        .x_labels(labels.len() + 2)
        .x_label_formatter(&|i| month_tick(&labels, *i))
        .x_desc("Month")
        .y_desc("Employees")
        .label_style((FONT, 20))
        .axis_desc_style((FONT, 24))
        .draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), HEADCOUNT_COLOR.stroke_width(4)))?;
    chart.draw_series(points.iter().map(|&p| Circle::new(p, 6, HEADCOUNT_COLOR.filled())))?;

    root.present()?;
    Ok(())
}

fn draw_hiring(monthly: &MonthlyTable, path: &Path) -> DrawResult {
    let labels = month_labels(monthly);
    let hires = month_series(monthly, |m| m.new_hires as f64);
    let turnover = month_series(monthly, |m| m.avg_turnover_rate);

    let root = BitMapBackend::new(path, LINE_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Hiring Activity vs Turnover Rate", (FONT, 40))
        .margin(30)
        .x_label_area_size(70)
        .y_label_area_size(100)
        .right_y_label_area_size(110)
        .build_cartesian_2d(month_axis(labels.len()), padded_range(&hires))?
        .set_secondary_coord(month_axis(labels.len()), padded_range(&turnover));

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(labels.len() + 2)
        .x_label_formatter(&|i| month_tick(&labels, *i))
        .x_desc("Month")
        .y_desc("New Hires")
        .label_style((FONT, 20))
        .axis_desc_style((FONT, 24))
        .draw()?;

    chart
        .configure_secondary_axes()
        .y_desc("Turnover Rate (%)")
        .y_label_formatter(&|v| format!("{v:.2}"))
        .label_style((FONT, 20))
        .axis_desc_style((FONT, 24))
        .draw()?;

    chart
        .draw_series(LineSeries::new(hires.iter().copied(), HIRES_COLOR.stroke_width(3)))?
        .label("New Hires")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 28, y)], HIRES_COLOR.stroke_width(3)));
    chart.draw_series(hires.iter().map(|&p| Circle::new(p, 6, HIRES_COLOR.filled())))?;

    chart
        .draw_secondary_series(LineSeries::new(turnover.iter().copied(), TURNOVER_COLOR.stroke_width(3)))?
        .label("Turnover Rate")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 28, y)], TURNOVER_COLOR.stroke_width(3)));
    chart.draw_secondary_series(turnover.iter().map(|&p| Circle::new(p, 6, TURNOVER_COLOR.filled())))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .label_font((FONT, 20))
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_departments(departments: &[DepartmentSnapshot], path: &Path) -> DrawResult {
    let root = BitMapBackend::new(path, DEPARTMENT_CHART_SIZE).into_drawing_area();
    draw_department_panels(&root, departments)?;
    root.present()?;
    Ok(())
}

fn draw_department_panels(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    departments: &[DepartmentSnapshot],
) -> DrawResult {
    let names: Vec<&str> = departments.iter().map(|d| d.department.as_str()).collect();
    let headcounts: Vec<f64> = departments.iter().map(|d| d.headcount as f64).collect();
    let turnover: Vec<f64> = departments.iter().map(|d| d.turnover_rate).collect();

    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));

    draw_bar_panel(
        &panels[0],
        "Headcount by Department",
        "Employees",
        &names,
        &headcounts,
        DEPT_HEADCOUNT_COLOR,
    )?;
    draw_bar_panel(
        &panels[1],
        "Turnover Rate by Department",
        "Turnover Rate (%)",
        &names,
        &turnover,
        DEPT_TURNOVER_COLOR,
    )?;
    Ok(())
}

fn draw_bar_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    title: &str,
    y_desc: &str,
    names: &[&str],
    values: &[f64],
    color: RGBColor,
) -> DrawResult {
    // A single bar still gets a two-slot axis; a zero-width integer range cannot be mapped.
    let last = (names.len() as i32 - 1).max(1);
    let y_max = values.iter().copied().fold(0.0, f64::max);
    let y_top = if y_max > 0.0 { y_max * 1.15 } else { 1.0 };

    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 32))
        .margin(24)
        .x_label_area_size(180)
        .y_label_area_size(90)
        .build_cartesian_2d((0..last).into_segmented(), 0f64..y_top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .bold_line_style(BLACK.mix(0.12))
        .light_line_style(WHITE)
        .x_labels(names.len())
        .x_label_formatter(&|v| segment_label(names, v))
        .y_desc(y_desc)
        // `label_style` sets both axes, so the rotated x style must come after it.
        .label_style((FONT, 18))
        .x_label_style(rotated_label_style())
        .axis_desc_style((FONT, 22))
        .draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, &v)| {
        let i = i as i32;
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), v)],
            color.filled(),
        );
        bar.set_margin(0, 0, 12, 12);
        bar
    }))?;

    Ok(())
}

/// Department names read downward from the tick.
fn rotated_label_style() -> TextStyle<'static> {
    TextStyle::from((FONT, 18).into_font().transform(FontTransform::Rotate90))
        .pos(Pos::new(HPos::Left, VPos::Center))
}

/// X axis for month charts: one integer slot per month, padded by one on each side.
fn month_axis(n: usize) -> std::ops::Range<i32> {
    -1..n as i32
}

fn month_series(monthly: &MonthlyTable, value: impl Fn(&MonthlyAggregate) -> f64) -> Vec<(i32, f64)> {
    monthly
        .iter()
        .enumerate()
        .map(|(i, m)| (i as i32, value(m)))
        .collect()
}

fn month_labels(monthly: &MonthlyTable) -> Vec<String> {
    monthly.iter().map(|m| m.month.label()).collect()
}

fn month_tick(labels: &[String], i: i32) -> String {
    usize::try_from(i)
        .ok()
        .and_then(|i| labels.get(i))
        .cloned()
        .unwrap_or_default()
}

fn segment_label(names: &[&str], v: &SegmentValue<i32>) -> String {
    match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| names.get(i))
            .map(|s| s.to_string())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    }
}

/// Y range covering the series with 10% headroom (or a unit band for flat data).
fn padded_range(points: &[(i32, f64)]) -> std::ops::Range<f64> {
    let lo = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let hi = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    if !(lo.is_finite() && hi.is_finite()) {
        return 0.0..1.0;
    }
    let pad = if hi > lo { (hi - lo) * 0.1 } else { hi.abs().max(1.0) * 0.05 };
    (lo - pad)..(hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MonthlyRecord;
    use crate::plot::font::require_test_font;
    use crate::report::build_insights;

    #[test]
    fn padded_range_handles_flat_and_empty_series() {
        assert_eq!(padded_range(&[]), 0.0..1.0);
        let flat = padded_range(&[(0, 100.0), (1, 100.0)]);
        assert!(flat.start < 100.0 && flat.end > 100.0);
        let r = padded_range(&[(0, 10.0), (1, 20.0)]);
        assert!((r.start - 9.0).abs() < 1e-12 && (r.end - 21.0).abs() < 1e-12);
    }

    #[test]
    fn tick_labels_only_on_known_slots() {
        let labels = vec!["Jan 2025".to_string(), "Feb 2025".to_string()];
        assert_eq!(month_tick(&labels, -1), "");
        assert_eq!(month_tick(&labels, 1), "Feb 2025");
        assert_eq!(month_tick(&labels, 2), "");
        assert_eq!(segment_label(&["Eng", "HR"], &SegmentValue::CenterOf(1)), "HR");
        assert_eq!(segment_label(&["Eng", "HR"], &SegmentValue::Last), "");
    }

    #[test]
    #[ignore = "needs a TrueType font: set HR_CHART_FONT or install DejaVu Sans, then run with --ignored"]
    fn renders_all_three_charts() {
        require_test_font();

        let mut records = Vec::new();
        for (month, scale) in [("2025-01", 0u32), ("2025-02", 3), ("2025-03", 5)] {
            for (dept, hc) in [("Engineering", 95u32), ("Sales", 62), ("HR", 18)] {
                records.push(MonthlyRecord {
                    month: month.parse().unwrap(),
                    department: dept.to_string(),
                    headcount: hc + scale,
                    new_hires: 2 + scale,
                    terminations: 1,
                    open_positions: 4,
                    time_to_fill_days: 30,
                    offer_acceptance_rate: 82.0,
                    turnover_rate: 1.0 + f64::from(scale) / 10.0,
                });
            }
        }
        let insights = build_insights(&records).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let headcount = dir.path().join("headcount.png");
        let hiring = dir.path().join("hiring.png");
        let department = dir.path().join("department.png");
        render_headcount_chart(&insights.monthly, &headcount).unwrap();
        render_hiring_chart(&insights.monthly, &hiring).unwrap();
        render_department_chart(&insights.departments, &department).unwrap();

        for path in [&headcount, &hiring, &department] {
            let bytes = std::fs::read(path).unwrap();
            assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "{} is not a PNG", path.display());
        }
    }

    #[test]
    #[ignore = "needs a TrueType font: set HR_CHART_FONT or install DejaVu Sans, then run with --ignored"]
    fn department_names_run_down_the_label_area() {
        require_test_font();

        let departments: Vec<DepartmentSnapshot> = ["Engineering", "Sales", "Operations", "Customer Success"]
            .iter()
            .enumerate()
            .map(|(i, name)| DepartmentSnapshot {
                department: name.to_string(),
                headcount: 100 - 10 * i as u64,
                turnover_rate: 1.5,
                time_to_fill_days: 30.0,
            })
            .collect();

        let (width, height) = DEPARTMENT_CHART_SIZE;
        let mut buf = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, DEPARTMENT_CHART_SIZE).into_drawing_area();
            draw_department_panels(&root, &departments).unwrap();
            root.present().unwrap();
        }

        // Left panel: margin 24, y label area 90, x label area 180 above the bottom margin.
        let label_rows = (height - 24 - 180 + 14)..(height - 24);
        let plot_cols = (24 + 90 + 6)..(width / 2 - 24);
        let dark = |x: u32, y: u32| {
            let i = ((y * width + x) * 3) as usize;
            buf[i..i + 3].iter().all(|&c| c < 96)
        };
        let inked_rows = label_rows
            .filter(|&y| plot_cols.clone().any(|x| dark(x, y)))
            .count();

        // Horizontal labels are one text line tall; "Customer Success" turned
        // on its side covers well over a hundred pixel rows.
        assert!(inked_rows > 60, "x labels cover only {inked_rows} rows");
    }
}
