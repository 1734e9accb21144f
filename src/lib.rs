//! MLCA: MLC leaf position analyzer
//!
//! Parses repeated leaf position test exports from a multi-leaf collimator
//! and reports per-leaf accuracy (deviation from the bank's nominal setpoint)
//! and reproducibility (spread of positions across runs).

pub mod analysis;
pub mod cli;
pub mod core;
