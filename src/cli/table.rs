//! Table rendering for terminal output

use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::analysis::{BankSummary, LeafResult, Metric, RankedEntry};
use crate::cli::helpers::{format_mm, format_signed_mm};

/// One leaf result row
#[derive(Tabled)]
pub struct LeafRow {
    #[tabled(rename = "Bank")]
    pub bank: String,
    #[tabled(rename = "Leaf")]
    pub leaf: String,
    #[tabled(rename = "Nominal (mm)")]
    pub nominal: i32,
    #[tabled(rename = "Runs")]
    pub runs: usize,
    #[tabled(rename = "Mean (mm)")]
    pub mean: String,
    #[tabled(rename = "Deviation (mm)")]
    pub deviation: String,
    #[tabled(rename = "Std Dev (mm)")]
    pub std_dev: String,
    #[tabled(rename = "Range (mm)")]
    pub range: String,
    #[tabled(rename = "OOT")]
    pub out_of_tolerance: String,
}

impl From<&LeafResult> for LeafRow {
    fn from(r: &LeafResult) -> Self {
        Self {
            bank: r.bank.clone(),
            leaf: r.leaf_id.clone(),
            nominal: r.nominal,
            runs: r.num_valid_runs,
            mean: format_mm(r.mean),
            deviation: format_signed_mm(r.deviation),
            std_dev: format_mm(r.std_dev),
            range: format_mm(r.range),
            out_of_tolerance: if r.out_of_tolerance { "yes" } else { "" }.to_string(),
        }
    }
}

/// One bank summary row
#[derive(Tabled)]
pub struct BankRow {
    #[tabled(rename = "Bank")]
    pub bank: String,
    #[tabled(rename = "Nominal (mm)")]
    pub nominal: i32,
    #[tabled(rename = "Leaves w/ Data")]
    pub with_data: String,
    #[tabled(rename = "OOT")]
    pub out_of_tolerance: usize,
    #[tabled(rename = "Max |Dev| (mm)")]
    pub max_abs_deviation: String,
    #[tabled(rename = "Mean Std Dev (mm)")]
    pub mean_std_dev: String,
    #[tabled(rename = "Max Range (mm)")]
    pub max_range: String,
}

impl From<&BankSummary> for BankRow {
    fn from(s: &BankSummary) -> Self {
        Self {
            bank: s.bank.clone(),
            nominal: s.nominal,
            with_data: format!("{}/{}", s.leaves_with_data, s.leaves),
            out_of_tolerance: s.out_of_tolerance,
            max_abs_deviation: format_mm(s.max_abs_deviation),
            mean_std_dev: format_mm(s.mean_std_dev),
            max_range: format_mm(s.max_range),
        }
    }
}

/// Render rows with the shared table style
pub fn render<T: Tabled>(rows: impl IntoIterator<Item = T>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Render a ranked list with 1-based ranks
pub fn render_ranking(entries: &[RankedEntry], metric: Metric) -> String {
    let value_header = match metric {
        Metric::Deviation => "Abs. Deviation (mm)",
        other => other.label(),
    };

    let mut builder = Builder::default();
    builder.push_record(["Rank", "Leaf", "Bank", value_header]);
    for (i, entry) in entries.iter().enumerate() {
        builder.push_record([
            (i + 1).to_string(),
            entry.leaf_id.clone(),
            entry.bank.clone(),
            format!("{:.3}", entry.value),
        ]);
    }

    builder.build().with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_ranking_has_ranks_and_header() {
        let entries = vec![
            RankedEntry {
                leaf_id: "L2".to_string(),
                bank: "Left MLC Bank +20".to_string(),
                value: 1.5,
            },
            RankedEntry {
                leaf_id: "L1".to_string(),
                bank: "Left MLC Bank +20".to_string(),
                value: 0.1,
            },
        ];
        let out = render_ranking(&entries, Metric::Deviation);
        assert!(out.contains("Abs. Deviation (mm)"));
        assert!(out.contains("1.500"));
        assert!(out.contains("L2"));
        assert!(out.find("L2").unwrap() < out.find("L1").unwrap());
    }

    #[test]
    fn test_leaf_row_formats_missing() {
        let r = LeafResult::from_series("Left MLC Bank +20", 0, 20, &[None], 1.0);
        let out = render([LeafRow::from(&r)]);
        assert!(out.contains("N/A"));
        assert!(out.contains("L1"));
    }
}
