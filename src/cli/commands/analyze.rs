//! `mlca analyze` command - full accuracy and reproducibility report

use std::path::PathBuf;
use std::sync::mpsc;

use console::style;
use miette::Result;

use crate::analysis::{
    join_analysis, spawn_analysis, AnalysisBundle, AnalysisOptions, Metric, ProgressEvent,
};
use crate::cli::helpers::{csv_cell, print_progress, print_warnings, write_csv};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::table::{render, render_ranking, BankRow, LeafRow};
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// Exported leaf position test file (CSV)
    pub file: PathBuf,

    /// Entries per ranked list (defaults to config top_n)
    #[arg(long, short = 'n')]
    pub top: Option<usize>,

    /// Also print every leaf result
    #[arg(long)]
    pub all: bool,

    /// Do not print the warnings list
    #[arg(long)]
    pub no_warnings: bool,
}

/// Run the analysis on a worker thread and print the report
pub fn run(args: AnalyzeArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.load_config()?;
    let options = AnalysisOptions::from(&config);
    let format = effective_format(global.format);
    let show_progress = !global.quiet && format == OutputFormat::Table;

    let (tx, rx) = mpsc::channel::<ProgressEvent>();
    let handle = spawn_analysis(args.file.clone(), options, tx);
    for event in rx {
        if show_progress {
            print_progress(&event);
        }
    }
    let bundle = join_analysis(handle)?;

    if print_structured(&bundle, format)? {
        return Ok(());
    }
    if format == OutputFormat::Csv {
        return write_results_csv(&bundle);
    }

    print_report(&bundle, args.top.unwrap_or(config.top_n), args.all);
    if !args.no_warnings {
        print_warnings(&bundle.warnings);
    }
    Ok(())
}

fn print_report(bundle: &AnalysisBundle, top_n: usize, all: bool) {
    println!();
    println!(
        "{}",
        style(format!(
            "MLC Leaf Reproducibility and Accuracy ({} run(s), {} bank(s))",
            bundle.run_count,
            bundle.banks.len()
        ))
        .bold()
    );
    println!("   Tolerance: ±{:.3} mm", bundle.tolerance_mm);
    println!();

    if bundle.results.is_empty() {
        println!("No analysis results to display.");
        return;
    }

    println!("{}", render(bundle.bank_summaries.iter().map(BankRow::from)));
    println!();

    let oot: Vec<LeafRow> = bundle.out_of_tolerance().map(LeafRow::from).collect();
    if oot.is_empty() {
        println!(
            "{} No leaves exceeded the ±{:.3} mm tolerance.",
            style("✓").green(),
            bundle.tolerance_mm
        );
    } else {
        println!(
            "{} {} leaf/leaves exceeding tolerance (±{:.3} mm):",
            style("✗").red(),
            style(oot.len()).red().bold(),
            bundle.tolerance_mm
        );
        println!("{}", render(oot));
    }

    for metric in Metric::ALL {
        println!();
        println!(
            "{}",
            style(format!("Top {} {}", top_n, metric.ranking_title())).bold()
        );
        let entries = bundle.rankings.top(metric, top_n);
        if entries.is_empty() {
            println!("  (no data)");
        } else {
            println!("{}", render_ranking(entries, metric));
        }
    }

    if all {
        println!();
        println!("{}", style("All Leaf Results").bold());
        println!("{}", render(bundle.results.iter().map(LeafRow::from)));
    }
}

fn write_results_csv(bundle: &AnalysisBundle) -> Result<()> {
    let header: Vec<String> = [
        "bank",
        "leaf_id",
        "leaf_index",
        "nominal_mm",
        "valid_runs",
        "mean_mm",
        "deviation_mm",
        "std_dev_mm",
        "range_mm",
        "out_of_tolerance",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let records = bundle.results.iter().map(|r| {
        vec![
            r.bank.clone(),
            r.leaf_id.clone(),
            r.element.to_string(),
            r.nominal.to_string(),
            r.num_valid_runs.to_string(),
            csv_cell(r.mean),
            csv_cell(r.deviation),
            csv_cell(r.std_dev),
            csv_cell(r.range),
            r.out_of_tolerance.to_string(),
        ]
    });

    write_csv(&header, records)
}
