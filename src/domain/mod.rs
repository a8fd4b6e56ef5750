//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the input row (`MonthlyRecord`) and its sortable `Month`
//! - derived tables (`MonthlyAggregate`, `DepartmentSnapshot`)
//! - resolved run settings (`ReportConfig`, `GenerateConfig`)

pub mod types;

pub use types::*;
