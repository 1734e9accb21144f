//! Analyzer configuration
//!
//! Fixed format constants plus a layered [`Config`] loaded from YAML:
//! built-in defaults, then the user config file, then an explicit
//! `--config` file. Command-line flags are applied last by the CLI.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_yml::{Mapping, Value};

use crate::core::error::AnalysisError;

/// Number of leaves (elements) per bank
pub const ELEMENT_COUNT: usize = 80;

/// Unit token terminating the value cells of a bank row
pub const UNIT_TOKEN: &str = "mm";

/// First two cells of the row that opens a new run block
pub const HEADER_TOKENS: (&str, &str) = ("Name", "Value");

/// Default out-of-tolerance threshold in mm
pub const DEFAULT_TOLERANCE_MM: f64 = 1.0;

/// Number of ranked entries shown by summary tables
pub const DEFAULT_TOP_N: usize = 10;

/// Bank row identifiers recognized in the export
pub const KNOWN_BANKS: [&str; 10] = [
    "Left MLC Bank +20",
    "Left MLC Bank +60",
    "Left MLC Bank 100",
    "Left MLC Bank -20",
    "Left MLC Bank -60",
    "Right MLC Bank +20",
    "Right MLC Bank +60",
    "Right MLC Bank 100",
    "Right MLC Bank -20",
    "Right MLC Bank -60",
];

/// File name looked up in the user configuration directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Format settings used by the block parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Leaves expected per bank per run
    pub element_count: usize,

    /// Recognized bank row identifiers (exact match on the first cell)
    pub banks: Vec<String>,

    /// Unit token ending the numeric cells (case-insensitive)
    pub unit_token: String,

    /// Literal first two cells of a run header row
    pub header_tokens: (String, String),
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            element_count: ELEMENT_COUNT,
            banks: KNOWN_BANKS.iter().map(|b| b.to_string()).collect(),
            unit_token: UNIT_TOKEN.to_string(),
            header_tokens: (HEADER_TOKENS.0.to_string(), HEADER_TOKENS.1.to_string()),
        }
    }
}

impl ParserConfig {
    /// Check whether a first cell names a recognized bank
    pub fn is_bank(&self, cell: &str) -> bool {
        self.banks.iter().any(|b| b == cell)
    }

    /// Check whether a row opens a new run block
    pub fn is_header(&self, first: &str, second: Option<&str>) -> bool {
        first == self.header_tokens.0 && second == Some(self.header_tokens.1.as_str())
    }

    /// Check whether a cell is the unit token
    pub fn is_unit(&self, cell: &str) -> bool {
        cell.eq_ignore_ascii_case(&self.unit_token)
    }
}

/// Complete analyzer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Out-of-tolerance threshold in mm (strict `>` comparison)
    pub tolerance_mm: f64,

    /// Entries shown in top-N ranking tables
    pub top_n: usize,

    /// Input format settings
    #[serde(flatten)]
    pub parser: ParserConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tolerance_mm: DEFAULT_TOLERANCE_MM,
            top_n: DEFAULT_TOP_N,
            parser: ParserConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, then the user file, then `explicit`
    ///
    /// A missing user file is not an error; a missing explicit file is.
    pub fn load(explicit: Option<&Path>) -> Result<Self, AnalysisError> {
        let user = user_config_path().filter(|path| path.is_file());
        Self::load_layers(user.as_deref(), explicit)
    }

    /// Merge YAML layers key by key; later layers win, absent keys fall through
    pub fn load_layers(user: Option<&Path>, explicit: Option<&Path>) -> Result<Self, AnalysisError> {
        let mut merged = Mapping::new();
        for path in user.into_iter().chain(explicit) {
            tracing::debug!(path = %path.display(), "loading config layer");
            for (key, value) in read_layer(path)? {
                merged.insert(key, value);
            }
        }

        let config: Self =
            serde_yml::from_value(Value::Mapping(merged)).map_err(|e| {
                AnalysisError::InvalidConfig {
                    message: e.to_string(),
                }
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML configuration file; unspecified fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, AnalysisError> {
        let content = read_file(path)?;
        Self::from_yaml(&content).map_err(|message| AnalysisError::InvalidConfig {
            message: format!("{}: {}", path.display(), message),
        })
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yml::from_str(content).map_err(|e| e.to_string())
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<(), AnalysisError> {
        validate_tolerance(self.tolerance_mm)?;
        if self.parser.element_count == 0 {
            return Err(AnalysisError::InvalidConfig {
                message: "element_count must be at least 1".to_string(),
            });
        }
        if self.parser.banks.is_empty() {
            return Err(AnalysisError::InvalidConfig {
                message: "at least one bank identifier is required".to_string(),
            });
        }
        if self.parser.unit_token.trim().is_empty() {
            return Err(AnalysisError::InvalidConfig {
                message: "unit_token must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String, AnalysisError> {
    fs::read_to_string(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Top-level keys of one config file; an empty file contributes nothing
fn read_layer(path: &Path) -> Result<Mapping, AnalysisError> {
    let invalid = |message: String| AnalysisError::InvalidConfig {
        message: format!("{}: {}", path.display(), message),
    };

    let content = read_file(path)?;
    if content.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yml::from_str::<Value>(&content).map_err(|e| invalid(e.to_string()))? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(invalid("expected a mapping of settings".to_string())),
    }
}

/// Tolerance must be a finite, non-negative number of mm
pub fn validate_tolerance(tolerance_mm: f64) -> Result<(), AnalysisError> {
    if tolerance_mm.is_finite() && tolerance_mm >= 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::InvalidTolerance {
            value: tolerance_mm,
        })
    }
}

/// Location of the per-user configuration file, if a home directory exists
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mlca").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
