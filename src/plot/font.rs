//! Runtime font registration for chart text.
//!
//! Plotters is built without its `ttf` feature (which links fontconfig), so text
//! is rasterized by `ab_glyph` from a font file we register ourselves.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::{FontStyle, register_font};
use tracing::debug;

use crate::error::AppError;

/// Family name every chart uses.
pub const CHART_FONT_FAMILY: &str = "sans-serif";

/// Checked in order when no font is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<PathBuf> = OnceLock::new();

/// Make sure [`CHART_FONT_FAMILY`] is backed by a real font.
///
/// The first successful call wins; later calls return the already-registered path.
pub fn ensure_chart_font(explicit: Option<&Path>) -> Result<&'static Path, AppError> {
    if let Some(path) = REGISTERED.get() {
        return Ok(path.as_path());
    }

    let path = resolve_font_path(explicit)?;
    let bytes = std::fs::read(&path)
        .map_err(|e| AppError::Font(format!("failed to read '{}': {e}", path.display())))?;

    // Plotters keeps a `'static` reference to the font data for the process lifetime.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font(CHART_FONT_FAMILY, FontStyle::Normal, bytes)
        .map_err(|_| AppError::Font(format!("'{}' is not a usable TrueType font", path.display())))?;

    debug!(font = %path.display(), "registered chart font");
    Ok(REGISTERED.get_or_init(|| path).as_path())
}

fn resolve_font_path(explicit: Option<&Path>) -> Result<PathBuf, AppError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(AppError::Font(format!("configured font '{}' does not exist", path.display())));
    }

    SYSTEM_FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
        .ok_or_else(|| {
            AppError::Font(
                "no system TrueType font found; pass --font or set HR_CHART_FONT".to_string(),
            )
        })
}

/// Register the chart font for a test, honouring `HR_CHART_FONT`.
#[cfg(test)]
pub(crate) fn require_test_font() -> &'static Path {
    let explicit = std::env::var_os("HR_CHART_FONT").map(PathBuf::from);
    match ensure_chart_font(explicit.as_deref()) {
        Ok(path) => path,
        Err(e) => panic!("chart tests need a TrueType font: {e}"),
    }
}
