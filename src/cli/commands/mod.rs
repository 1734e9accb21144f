//! CLI command implementations

pub mod analyze;
pub mod banks;
pub mod completions;
pub mod heatmap;
pub mod profile;
pub mod rank;
