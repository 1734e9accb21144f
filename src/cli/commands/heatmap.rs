//! `mlca heatmap` command - bank × leaf grid of one metric

use std::path::PathBuf;

use miette::Result;

use crate::analysis::{analyze_file, AnalysisOptions, Metric};
use crate::cli::helpers::{csv_cell, write_csv};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::viz::render_heatmap;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct HeatmapArgs {
    /// Exported leaf position test file (CSV)
    pub file: PathBuf,

    /// Metric to display
    #[arg(long, short = 'm', value_enum, default_value_t = Metric::Deviation)]
    pub metric: Metric,
}

pub fn run(args: HeatmapArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.load_config()?;
    let bundle = analyze_file(&args.file, &AnalysisOptions::from(&config))?;
    let grid = bundle.grid(args.metric);

    let format = effective_format(global.format);
    if print_structured(&grid, format)? {
        return Ok(());
    }

    match format {
        OutputFormat::Csv => {
            let header: Vec<String> = std::iter::once("bank".to_string())
                .chain((1..=grid.element_count).map(|n| format!("leaf_{}", n)))
                .collect();
            write_csv(
                &header,
                grid.banks.iter().enumerate().map(|(row, bank)| {
                    std::iter::once(bank.clone())
                        .chain(grid.row(row).iter().map(|v| csv_cell(*v)))
                        .collect::<Vec<_>>()
                }),
            )
        }
        _ => {
            println!("{}", render_heatmap(&grid, bundle.tolerance_mm));
            Ok(())
        }
    }
}
