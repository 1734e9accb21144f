//! Ranking engine - worst leaves first
//!
//! Three independent lists: |deviation| (inaccuracy), standard deviation
//! (imprecision) and positional range. Each is sorted descending with a
//! stable sort, so ties keep discovery order (bank order, then leaf
//! position ascending).

use serde::Serialize;

use crate::analysis::grid::Metric;
use crate::analysis::stats::LeafResult;

/// One row of a ranked list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub leaf_id: String,
    pub bank: String,
    pub value: f64,
}

/// The three ranked lists, full length
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rankings {
    /// By |deviation|, descending
    pub inaccurate: Vec<RankedEntry>,

    /// By standard deviation, descending
    pub imprecise: Vec<RankedEntry>,

    /// By positional range, descending
    pub by_range: Vec<RankedEntry>,
}

impl Rankings {
    /// Full list for a metric
    pub fn list(&self, metric: Metric) -> &[RankedEntry] {
        match metric {
            Metric::Deviation => &self.inaccurate,
            Metric::StdDev => &self.imprecise,
            Metric::Range => &self.by_range,
        }
    }

    /// First `n` entries for a metric
    pub fn top(&self, metric: Metric, n: usize) -> &[RankedEntry] {
        let list = self.list(metric);
        &list[..n.min(list.len())]
    }
}

/// Rank all results; `results` must be in discovery order
pub fn rank_results(results: &[LeafResult]) -> Rankings {
    Rankings {
        inaccurate: rank_by(results, Metric::Deviation),
        imprecise: rank_by(results, Metric::StdDev),
        by_range: rank_by(results, Metric::Range),
    }
}

/// Project one metric and sort descending; undefined values are left out
pub fn rank_by(results: &[LeafResult], metric: Metric) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = results
        .iter()
        .filter_map(|r| {
            metric.ranking_value(r).map(|value| RankedEntry {
                leaf_id: r.leaf_id.clone(),
                bank: r.bank.clone(),
                value,
            })
        })
        .collect();

    // sort_by is stable: equal values stay in discovery order
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    entries
}
