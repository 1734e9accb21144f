//! Leaf position analysis - parser, matrix, statistics, rankings

pub mod grid;
pub mod matrix;
pub mod parser;
pub mod pipeline;
pub mod ranking;
pub mod stats;

pub use grid::{summarize_banks, BankSummary, Metric, MetricGrid};
pub use matrix::{build_matrix, Matrix};
pub use parser::{parse_blocks, Measurement, ParsedRuns, RunBlock, MISSING};
pub use pipeline::{
    analyze_file, analyze_str, analyze_with_progress, join_analysis, spawn_analysis,
    AnalysisBundle, AnalysisOptions, NoProgress, ProgressEvent, ProgressSink,
};
pub use ranking::{rank_by, rank_results, RankedEntry, Rankings};
pub use stats::{compute_statistics, describe, is_out_of_tolerance, LeafResult, Moments};
