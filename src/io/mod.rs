//! Input/output helpers.
//!
//! - CSV ingest (`ingest`)
//! - dataset, summary, and metrics writers (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
