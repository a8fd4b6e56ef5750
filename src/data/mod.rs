//! Mock input data.

pub mod sample;

pub use sample::{DEPARTMENTS, DepartmentProfile, generate_records};
