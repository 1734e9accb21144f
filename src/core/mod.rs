//! Core module - configuration, diagnostics and bank identifiers

pub mod bank;
pub mod config;
pub mod error;

pub use bank::{extract_nominal, leaf_id, Side};
pub use config::{Config, ParserConfig, ELEMENT_COUNT, KNOWN_BANKS, UNIT_TOKEN};
pub use error::{AnalysisError, Warning};
