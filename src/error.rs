use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::Month;

/// Every failure the two pipelines can report.
///
/// Each variant maps to a process exit code (see [`AppError::exit_code`]):
/// `2` for bad input or configuration, `3` for data that cannot be summarized,
/// `4` for failures while producing outputs.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Metrics file not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("Failed to parse '{}' (line {line}): {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Need at least {needed} months of data to compare periods, found {found}.")]
    InsufficientPeriods { needed: usize, found: usize },

    #[error("No department rows for {month}.")]
    EmptySnapshot { month: Month },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render {chart} chart '{}': {message}", path.display())]
    Render {
        chart: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("Chart font unavailable: {0}")]
    Font(String),

    #[error("Failed to write presentation '{}': {message}", path.display())]
    Package { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::MissingInput { .. } | Self::Parse { .. } | Self::Config(_) => 2,
            Self::InsufficientPeriods { .. } | Self::EmptySnapshot { .. } => 3,
            Self::Io { .. } | Self::Render { .. } | Self::Font(_) | Self::Package { .. } => 4,
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn render(chart: &'static str, path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Render {
            chart,
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub fn package(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Package {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}
