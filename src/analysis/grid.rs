//! Bank × leaf aggregates consumed by tables, heatmaps and reports

use clap::ValueEnum;
use serde::Serialize;

use crate::analysis::stats::LeafResult;

/// Per-leaf quantity that can be ranked or gridded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Mean deviation from nominal (accuracy)
    Deviation,
    /// Standard deviation across runs (reproducibility)
    StdDev,
    /// Max - min across runs
    Range,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Deviation, Metric::StdDev, Metric::Range];

    /// Value placed in grids; deviation keeps its sign
    pub fn grid_value(&self, result: &LeafResult) -> Option<f64> {
        match self {
            Metric::Deviation => result.deviation,
            Metric::StdDev => result.std_dev,
            Metric::Range => result.range,
        }
    }

    /// Value used for ranking; deviation is ranked by magnitude
    pub fn ranking_value(&self, result: &LeafResult) -> Option<f64> {
        match self {
            Metric::Deviation => result.abs_deviation(),
            Metric::StdDev => result.std_dev,
            Metric::Range => result.range,
        }
    }

    /// Column heading for tables
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Deviation => "Deviation (mm)",
            Metric::StdDev => "Std Dev (mm)",
            Metric::Range => "Range (mm)",
        }
    }

    /// Heading for ranked lists
    pub fn ranking_title(&self) -> &'static str {
        match self {
            Metric::Deviation => "Most Inaccurate Leaves",
            Metric::StdDev => "Most Imprecise Leaves",
            Metric::Range => "Largest Positional Range",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Deviation => write!(f, "deviation"),
            Metric::StdDev => write!(f, "std-dev"),
            Metric::Range => write!(f, "range"),
        }
    }
}

/// Two-dimensional grid of one metric: one row per bank, one column per leaf
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricGrid {
    pub metric: Metric,
    pub banks: Vec<String>,
    pub element_count: usize,
    /// Row-major cells, `banks.len() * element_count`
    pub cells: Vec<Option<f64>>,
}

impl MetricGrid {
    /// Pivot results into a grid; banks keep discovery order
    pub fn from_results(results: &[LeafResult], metric: Metric, element_count: usize) -> Self {
        let mut banks: Vec<String> = Vec::new();
        for r in results {
            if !banks.contains(&r.bank) {
                banks.push(r.bank.clone());
            }
        }

        let mut cells = vec![None; banks.len() * element_count];
        for r in results {
            if r.element >= element_count {
                continue;
            }
            if let Some(row) = banks.iter().position(|b| *b == r.bank) {
                cells[row * element_count + r.element] = metric.grid_value(r);
            }
        }

        Self {
            metric,
            banks,
            element_count,
            cells,
        }
    }

    /// Cells of one bank row
    pub fn row(&self, bank: usize) -> &[Option<f64>] {
        let start = bank * self.element_count;
        &self.cells[start..start + self.element_count]
    }

    /// Smallest and largest defined cell values
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.cells.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Per-bank roll-up of leaf results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankSummary {
    pub bank: String,
    pub nominal: i32,
    pub leaves: usize,
    /// Leaves with at least one valid measurement
    pub leaves_with_data: usize,
    pub out_of_tolerance: usize,
    pub max_abs_deviation: Option<f64>,
    pub mean_std_dev: Option<f64>,
    pub max_range: Option<f64>,
}

/// Summarize results bank by bank, in discovery order
pub fn summarize_banks(results: &[LeafResult]) -> Vec<BankSummary> {
    let mut summaries: Vec<BankSummary> = Vec::new();
    let mut std_devs: Vec<Vec<f64>> = Vec::new();

    for r in results {
        let idx = match summaries.iter().position(|s| s.bank == r.bank) {
            Some(idx) => idx,
            None => {
                summaries.push(BankSummary {
                    bank: r.bank.clone(),
                    nominal: r.nominal,
                    leaves: 0,
                    leaves_with_data: 0,
                    out_of_tolerance: 0,
                    max_abs_deviation: None,
                    mean_std_dev: None,
                    max_range: None,
                });
                std_devs.push(Vec::new());
                summaries.len() - 1
            }
        };

        let summary = &mut summaries[idx];
        summary.leaves += 1;
        if r.num_valid_runs > 0 {
            summary.leaves_with_data += 1;
        }
        if r.out_of_tolerance {
            summary.out_of_tolerance += 1;
        }
        summary.max_abs_deviation = max_option(summary.max_abs_deviation, r.abs_deviation());
        summary.max_range = max_option(summary.max_range, r.range);
        if let Some(sd) = r.std_dev {
            std_devs[idx].push(sd);
        }
    }

    for (summary, sds) in summaries.iter_mut().zip(&std_devs) {
        if !sds.is_empty() {
            summary.mean_std_dev = Some(sds.iter().sum::<f64>() / sds.len() as f64);
        }
    }

    summaries
}

fn max_option(current: Option<f64>, candidate: Option<f64>) -> Option<f64> {
    match (current, candidate) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}
