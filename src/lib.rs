//! `hr-dashboard` library crate.
//!
//! The binary (`hrdash`) is a thin wrapper around this library so that:
//!
//! - the pipelines are testable without spawning processes
//! - aggregation and narrative code can be reused without the chart/deck outputs

pub mod app;
pub mod cli;
pub mod data;
pub mod deck;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
