//! Analysis pipeline: parse → matrix → statistics → ranking
//!
//! The pipeline is synchronous and deterministic. Callers that must stay
//! responsive use [`spawn_analysis`], which runs the same pass on a worker
//! thread and reports progress through a one-way [`ProgressSink`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use serde::Serialize;

use crate::analysis::grid::{summarize_banks, BankSummary, Metric, MetricGrid};
use crate::analysis::matrix::build_matrix;
use crate::analysis::parser::parse_blocks;
use crate::analysis::ranking::{rank_results, Rankings};
use crate::analysis::stats::{compute_statistics, LeafResult};
use crate::core::config::{validate_tolerance, Config, ParserConfig, DEFAULT_TOLERANCE_MM};
use crate::core::error::{AnalysisError, Warning};

/// Inputs that shape one analysis pass
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub tolerance_mm: f64,
    pub parser: ParserConfig,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            tolerance_mm: DEFAULT_TOLERANCE_MM,
            parser: ParserConfig::default(),
        }
    }
}

impl AnalysisOptions {
    pub fn with_tolerance(tolerance_mm: f64) -> Self {
        Self {
            tolerance_mm,
            ..Self::default()
        }
    }
}

impl From<&Config> for AnalysisOptions {
    fn from(config: &Config) -> Self {
        Self {
            tolerance_mm: config.tolerance_mm,
            parser: config.parser.clone(),
        }
    }
}

/// Everything a successful pass produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisBundle {
    /// Tolerance the flags were computed against (echoed)
    pub tolerance_mm: f64,
    pub run_count: usize,
    pub element_count: usize,
    /// Bank names in discovery order
    pub banks: Vec<String>,
    pub results: Vec<LeafResult>,
    pub rankings: Rankings,
    pub bank_summaries: Vec<BankSummary>,
    /// Recoverable diagnostics in pipeline order
    pub warnings: Vec<Warning>,
}

impl AnalysisBundle {
    /// Leaves flagged out of tolerance, in discovery order
    pub fn out_of_tolerance(&self) -> impl Iterator<Item = &LeafResult> {
        self.results.iter().filter(|r| r.out_of_tolerance)
    }

    /// Bank × leaf grid for a metric
    pub fn grid(&self, metric: Metric) -> MetricGrid {
        MetricGrid::from_results(&self.results, metric, self.element_count)
    }
}

/// Progress notifications emitted while a pass runs
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Started { source: String },
    Parsed { runs: usize },
    MatrixBuilt { banks: usize },
    StatisticsComputed { results: usize },
    Ranked,
    Finished { warnings: usize },
    Failed { message: String },
}

/// One-way receiver of progress events; delivery failures are ignored
pub trait ProgressSink {
    fn emit(&self, event: ProgressEvent);
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&self, _event: ProgressEvent) {}
}

impl ProgressSink for Sender<ProgressEvent> {
    fn emit(&self, event: ProgressEvent) {
        let _ = self.send(event);
    }
}

impl<F: Fn(ProgressEvent)> ProgressSink for F {
    fn emit(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Analyze export text
pub fn analyze_str(text: &str, options: &AnalysisOptions) -> Result<AnalysisBundle, AnalysisError> {
    run_pipeline(text, options, &NoProgress)
}

/// Read and analyze an export file
pub fn analyze_file(path: &Path, options: &AnalysisOptions) -> Result<AnalysisBundle, AnalysisError> {
    analyze_with_progress(path, options, &NoProgress)
}

/// Read and analyze an export file, reporting progress
pub fn analyze_with_progress(
    path: &Path,
    options: &AnalysisOptions,
    sink: &dyn ProgressSink,
) -> Result<AnalysisBundle, AnalysisError> {
    sink.emit(ProgressEvent::Started {
        source: path.display().to_string(),
    });

    let outcome = read_input(path).and_then(|text| run_pipeline(&text, options, sink));
    if let Err(err) = &outcome {
        sink.emit(ProgressEvent::Failed {
            message: err.to_string(),
        });
    }
    outcome
}

/// Run a pass on a worker thread
///
/// The handle yields the same result as [`analyze_file`]; a panicking
/// worker surfaces as [`AnalysisError::WorkerPanicked`] via [`join_analysis`].
pub fn spawn_analysis<S>(
    path: PathBuf,
    options: AnalysisOptions,
    sink: S,
) -> JoinHandle<Result<AnalysisBundle, AnalysisError>>
where
    S: ProgressSink + Send + 'static,
{
    thread::spawn(move || analyze_with_progress(&path, &options, &sink))
}

/// Wait for a spawned pass
pub fn join_analysis(
    handle: JoinHandle<Result<AnalysisBundle, AnalysisError>>,
) -> Result<AnalysisBundle, AnalysisError> {
    handle.join().map_err(|_| AnalysisError::WorkerPanicked)?
}

fn read_input(path: &Path) -> Result<String, AnalysisError> {
    let bytes = fs::read(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn run_pipeline(
    text: &str,
    options: &AnalysisOptions,
    sink: &dyn ProgressSink,
) -> Result<AnalysisBundle, AnalysisError> {
    validate_tolerance(options.tolerance_mm)?;

    let parsed = parse_blocks(text, &options.parser)?;
    if parsed.run_count() == 0 {
        return Err(AnalysisError::NoRuns);
    }
    sink.emit(ProgressEvent::Parsed {
        runs: parsed.run_count(),
    });

    let mut warnings = parsed.warnings.clone();
    let matrix = build_matrix(&parsed, options.parser.element_count, &mut warnings);
    sink.emit(ProgressEvent::MatrixBuilt {
        banks: matrix.banks().len(),
    });

    let results = compute_statistics(&matrix, options.tolerance_mm, &mut warnings);
    sink.emit(ProgressEvent::StatisticsComputed {
        results: results.len(),
    });

    let rankings = rank_results(&results);
    sink.emit(ProgressEvent::Ranked);

    let bundle = AnalysisBundle {
        tolerance_mm: options.tolerance_mm,
        run_count: matrix.run_count(),
        element_count: matrix.element_count(),
        banks: matrix.banks().to_vec(),
        bank_summaries: summarize_banks(&results),
        results,
        rankings,
        warnings,
    };

    sink.emit(ProgressEvent::Finished {
        warnings: bundle.warnings.len(),
    });
    tracing::debug!(
        runs = bundle.run_count,
        banks = bundle.banks.len(),
        warnings = bundle.warnings.len(),
        "analysis complete"
    );
    Ok(bundle)
}
