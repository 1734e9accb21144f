//! Fatal errors and recoverable warnings
//!
//! A fatal [`AnalysisError`] aborts the pass with no partial results.
//! Everything else becomes a [`Warning`] appended, in order, to the
//! diagnostics carried by the result bundle.

use std::path::PathBuf;

use miette::Diagnostic;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors that abort an analysis pass
#[derive(Debug, Error, Diagnostic)]
pub enum AnalysisError {
    #[error("Failed to read {}: {source}", path.display())]
    #[diagnostic(code(mlca::io), help("check that the file exists and is readable"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reader-level failure; parsing in-memory text with a flexible reader
    /// does not produce one in practice
    #[error("Malformed delimited input: {0}")]
    #[diagnostic(code(mlca::csv))]
    Csv(#[from] csv::Error),

    #[error("No run blocks found in input")]
    #[diagnostic(
        code(mlca::no_runs),
        help("expected a 'Name,Value' header row or at least one recognized bank row")
    )]
    NoRuns,

    #[error("Tolerance must be a finite, non-negative value (got {value})")]
    #[diagnostic(code(mlca::tolerance))]
    InvalidTolerance { value: f64 },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(mlca::config))]
    InvalidConfig { message: String },

    #[error("Analysis worker terminated unexpectedly")]
    #[diagnostic(code(mlca::worker))]
    WorkerPanicked,
}

/// Non-fatal conditions recorded while the pipeline keeps going
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Warning {
    #[error("Data for bank '{bank}' (row {row}) found before a 'Name,Value' header; assigning to run 1")]
    DataBeforeHeader { bank: String, row: usize },

    #[error("Run {run}, bank '{bank}': could not parse '{token}' for leaf {element}; using missing value")]
    MalformedValue {
        run: usize,
        bank: String,
        element: usize,
        token: String,
    },

    #[error("Run {run}, bank '{bank}': expected {expected} values, found {found}; remaining leaves set to missing")]
    CountMismatch {
        run: usize,
        bank: String,
        expected: usize,
        found: usize,
    },

    #[error("Run {run}, bank '{bank}': {found} values found, truncating to {expected}")]
    Truncated {
        run: usize,
        bank: String,
        expected: usize,
        found: usize,
    },

    #[error("Run {run}, bank '{bank}' (row {row}): no numeric values found; all leaves set to missing")]
    NoValues { run: usize, bank: String, row: usize },

    #[error("Run {run}, bank '{bank}' (row {row}): repeated bank row replaces the earlier one")]
    DuplicateBankRow { run: usize, bank: String, row: usize },

    #[error("Bank '{bank}' has no data in run {run}")]
    BankMissingFromRun { bank: String, run: usize },

    #[error("Bank '{bank}' matrix is {elements}x{runs}, expected {expected_elements}x{expected_runs}")]
    MatrixShape {
        bank: String,
        elements: usize,
        runs: usize,
        expected_elements: usize,
        expected_runs: usize,
    },

    #[error("Skipping bank '{bank}': could not extract a nominal value from its name")]
    NominalUnavailable { bank: String },

    #[error("Analysis completed but produced no leaf results")]
    EmptyAnalysis,
}

impl Serialize for Warning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Append a warning and mirror it to the log
pub(crate) fn push_warning(warnings: &mut Vec<Warning>, warning: Warning) {
    tracing::warn!("{}", warning);
    warnings.push(warning);
}
