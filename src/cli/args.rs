//! Command-line arguments

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    analyze::AnalyzeArgs, banks::BanksArgs, completions::CompletionsArgs, heatmap::HeatmapArgs,
    profile::ProfileArgs, rank::RankArgs,
};
use crate::core::config::validate_tolerance;
use crate::core::{AnalysisError, Config};

/// MLC leaf position analyzer
///
/// Reads repeated leaf position test exports and reports per-leaf accuracy
/// (deviation from nominal) and reproducibility (spread across runs).
#[derive(Parser, Debug)]
#[command(name = "mlca", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze an export: summary, out-of-tolerance leaves and top rankings
    Analyze(AnalyzeArgs),

    /// Print a full ranked list for one metric
    Rank(RankArgs),

    /// Bank × leaf heatmap of one metric
    Heatmap(HeatmapArgs),

    /// Plot a metric across the leaves of one side
    Profile(ProfileArgs),

    /// List recognized bank identifiers and their nominal setpoints
    Banks(BanksArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Configuration file (YAML); overrides the user config file
    #[arg(long, short = 'c', global = true, env = "MLCA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Out-of-tolerance threshold in mm (strict: |deviation| > tolerance)
    #[arg(long, short = 't', global = true, env = "MLCA_TOLERANCE")]
    pub tolerance: Option<f64>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v, -vv)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

impl GlobalOpts {
    /// Load configuration and apply command-line overrides
    pub fn load_config(&self) -> Result<Config, AnalysisError> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(tolerance) = self.tolerance {
            validate_tolerance(tolerance)?;
            config.tolerance_mm = tolerance;
        }
        tracing::debug!(tolerance_mm = config.tolerance_mm, "configuration ready");
        Ok(config)
    }
}

/// Output format selection
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tables for terminals
    #[default]
    Auto,
    Table,
    Json,
    Yaml,
    Csv,
}
