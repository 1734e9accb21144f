//! `mlca rank` command - full ranked list for one metric

use std::path::PathBuf;

use miette::Result;
use serde::Serialize;

use crate::analysis::{analyze_file, AnalysisOptions, Metric, RankedEntry};
use crate::cli::helpers::write_csv;
use crate::cli::output::{effective_format, print_structured};
use crate::cli::table::render_ranking;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct RankArgs {
    /// Exported leaf position test file (CSV)
    pub file: PathBuf,

    /// Metric to rank by
    #[arg(long, short = 'b', value_enum, default_value_t = Metric::Deviation)]
    pub by: Metric,

    /// Limit number of entries (default: all)
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(Serialize)]
struct RankedOutput<'a> {
    metric: Metric,
    tolerance_mm: f64,
    entries: &'a [RankedEntry],
}

pub fn run(args: RankArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.load_config()?;
    let bundle = analyze_file(&args.file, &AnalysisOptions::from(&config))?;

    let list = bundle.rankings.list(args.by);
    let entries = match args.limit {
        Some(n) => bundle.rankings.top(args.by, n),
        None => list,
    };

    let format = effective_format(global.format);
    let output = RankedOutput {
        metric: args.by,
        tolerance_mm: bundle.tolerance_mm,
        entries,
    };
    if print_structured(&output, format)? {
        return Ok(());
    }

    match format {
        OutputFormat::Csv => {
            let header: Vec<String> = ["rank", "leaf_id", "bank", "value_mm"]
                .iter()
                .map(|s| s.to_string())
                .collect();
            write_csv(
                &header,
                entries.iter().enumerate().map(|(i, e)| {
                    vec![
                        (i + 1).to_string(),
                        e.leaf_id.clone(),
                        e.bank.clone(),
                        e.value.to_string(),
                    ]
                }),
            )
        }
        _ => {
            if entries.is_empty() {
                println!("No leaves with defined {} values.", args.by);
            } else {
                println!("{}", render_ranking(entries, args.by));
                println!("{} of {} ranked leaves", entries.len(), list.len());
            }
            Ok(())
        }
    }
}
