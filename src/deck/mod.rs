//! The executive slide deck.
//!
//! The deck is built as a small in-memory model (slides made of text boxes and
//! pictures, positioned in EMUs) and then serialized by [`package`] into a
//! PPTX file. Keeping layout and serialization apart lets the layout be tested
//! without unzipping anything.

use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::plot::{ChartImage, ChartSet};
use crate::report::wrap_text;

pub mod package;

pub use package::write_pptx;

pub const PRESENTATION_FILE: &str = "hr_metrics_executive_dashboard.pptx";

/// English Metric Units per inch.
pub const EMU_PER_INCH: f64 = 914_400.0;
/// 16:9 widescreen, 13.333in x 7.5in.
pub const SLIDE_WIDTH_EMU: i64 = 12_192_000;
pub const SLIDE_HEIGHT_EMU: i64 = 6_858_000;

const DECK_TITLE: &str = "HR Metrics Automation Dashboard";
const SUMMARY_WRAP_COLUMNS: usize = 120;
const TITLE_PT: u32 = 30;
const SUBTITLE_PT: u32 = 16;
const HEADING_PT: u32 = 20;
const SUMMARY_PT: u32 = 15;
const BULLET_PT: u32 = 16;
const CHART_WIDTH_IN: f64 = 12.0;

pub fn inches(v: f64) -> i64 {
    (v * EMU_PER_INCH).round() as i64
}

/// Position and size of a shape, in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Frame {
    pub fn from_inches(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x: inches(x),
            y: inches(y),
            cx: inches(w),
            cy: inches(h),
        }
    }
}

/// A paragraph of one or more hard-wrapped lines sharing one run style.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub lines: Vec<String>,
    pub size_pt: u32,
    pub bold: bool,
    pub bullet: bool,
}

impl Paragraph {
    pub fn plain(text: impl Into<String>, size_pt: u32) -> Self {
        Self {
            lines: vec![text.into()],
            size_pt,
            bold: false,
            bullet: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn bulleted(mut self) -> Self {
        self.bullet = true;
        self
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub frame: Frame,
    pub word_wrap: bool,
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub frame: Frame,
    pub image: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Text(TextBox),
    Picture(Picture),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Slide {
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// Title (30pt bold) and optional subtitle (16pt) across the top.
    fn titled(title: &str, subtitle: Option<&str>) -> Self {
        let mut slide = Slide::default();
        slide.shapes.push(Shape::Text(TextBox {
            frame: Frame::from_inches(0.6, 0.3, 12.0, 0.8),
            word_wrap: false,
            paragraphs: vec![Paragraph::plain(title, TITLE_PT).bold()],
        }));
        if let Some(subtitle) = subtitle {
            slide.shapes.push(Shape::Text(TextBox {
                frame: Frame::from_inches(0.6, 1.0, 12.0, 0.5),
                word_wrap: false,
                paragraphs: vec![Paragraph::plain(subtitle, SUBTITLE_PT)],
            }));
        }
        slide
    }

    /// Full-width chart under the title, height following the image's aspect ratio.
    fn with_chart(mut self, chart: &ChartImage) -> Self {
        let width = inches(CHART_WIDTH_IN);
        let height = if chart.width_px == 0 {
            width / 2
        } else {
            (width as f64 * f64::from(chart.height_px) / f64::from(chart.width_px)).round() as i64
        };
        self.shapes.push(Shape::Picture(Picture {
            frame: Frame {
                x: inches(0.7),
                y: inches(1.6),
                cx: width,
                cy: height,
            },
            image: chart.path.clone(),
        }));
        self
    }

    /// All text on the slide, paragraph by paragraph.
    pub fn texts(&self) -> Vec<String> {
        self.shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Text(t) => Some(t.paragraphs.iter().map(Paragraph::text)),
                Shape::Picture(_) => None,
            })
            .flatten()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    pub title: String,
    pub generated_at: DateTime<Local>,
    pub slides: Vec<Slide>,
}

/// Lay out the five report slides.
pub fn build_deck(
    summary: &str,
    key_insights: &[String],
    charts: &ChartSet,
    generated_at: DateTime<Local>,
) -> Deck {
    let generated = generated_at.format("Generated %b %d, %Y").to_string();

    let mut overview = Slide::titled(DECK_TITLE, Some(&generated));
    overview.shapes.push(Shape::Text(TextBox {
        frame: Frame::from_inches(0.8, 1.7, 11.8, 4.8),
        word_wrap: true,
        paragraphs: vec![
            Paragraph::plain("Executive Summary", HEADING_PT).bold(),
            Paragraph {
                lines: wrap_text(summary, SUMMARY_WRAP_COLUMNS),
                size_pt: SUMMARY_PT,
                bold: false,
                bullet: false,
            },
        ],
    }));

    let headcount = Slide::titled(
        "Headcount Trends",
        Some("Monthly total headcount across all departments"),
    )
    .with_chart(&charts.headcount);
    let hiring = Slide::titled("Hiring Metrics", Some("New hires and turnover rate by month"))
        .with_chart(&charts.hiring);
    let departments = Slide::titled(
        "Departmental Breakdown",
        Some("Latest month headcount and turnover comparison"),
    )
    .with_chart(&charts.department);

    let mut insights = Slide::titled("Key Insights & Recommendations", None);
    insights.shapes.push(Shape::Text(TextBox {
        frame: Frame::from_inches(0.8, 1.5, 11.8, 5.5),
        word_wrap: true,
        paragraphs: key_insights
            .iter()
            .map(|b| Paragraph::plain(b.as_str(), BULLET_PT).bulleted())
            .collect(),
    }));

    Deck {
        title: DECK_TITLE.to_string(),
        generated_at,
        slides: vec![overview, headcount, hiring, departments, insights],
    }
}
