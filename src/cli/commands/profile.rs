//! `mlca profile` command - per-leaf plot for one side

use std::path::PathBuf;

use clap::ValueEnum;
use miette::Result;

use crate::analysis::{analyze_file, AnalysisOptions, Metric};
use crate::cli::viz::render_profile;
use crate::cli::GlobalOpts;
use crate::core::Side;

/// Side selection
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SideArg {
    Left,
    Right,
}

impl From<SideArg> for Side {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Left => Side::Left,
            SideArg::Right => Side::Right,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ProfileArgs {
    /// Exported leaf position test file (CSV)
    pub file: PathBuf,

    /// Which banks to plot
    #[arg(long, short = 's', value_enum, default_value = "left")]
    pub side: SideArg,

    /// Metric to plot
    #[arg(long, short = 'm', value_enum, default_value_t = Metric::Deviation)]
    pub metric: Metric,
}

pub fn run(args: ProfileArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.load_config()?;
    let bundle = analyze_file(&args.file, &AnalysisOptions::from(&config))?;

    println!(
        "{}",
        render_profile(
            &bundle.results,
            args.side.into(),
            args.metric,
            bundle.tolerance_mm,
            bundle.element_count,
        )
    );
    Ok(())
}
