//! Shared helper functions for CLI commands

use std::io;

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::analysis::ProgressEvent;
use crate::core::Warning;

/// Format an optional mm value with three decimals, "N/A" when undefined
pub fn format_mm(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => "N/A".to_string(),
    }
}

/// Same as [`format_mm`] but always shows the sign
pub fn format_signed_mm(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:+.3}", v),
        None => "N/A".to_string(),
    }
}

/// Optional value as a CSV cell; undefined values are empty
pub fn csv_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Print one progress event to stderr
pub fn print_progress(event: &ProgressEvent) {
    match event {
        ProgressEvent::Started { source } => {
            eprintln!("{} Parsing {}", style("⚙").cyan(), style(source).cyan())
        }
        ProgressEvent::Parsed { runs } => eprintln!("  Parsed {} run(s)", runs),
        ProgressEvent::MatrixBuilt { banks } => eprintln!("  Found {} bank(s)", banks),
        ProgressEvent::StatisticsComputed { results } => {
            eprintln!("  Computed statistics for {} leaves", results)
        }
        ProgressEvent::Ranked => eprintln!("  Ranked leaves"),
        ProgressEvent::Finished { warnings } => eprintln!(
            "{} Analysis complete ({} warning(s))",
            style("✓").green(),
            warnings
        ),
        ProgressEvent::Failed { message } => {
            eprintln!("{} Analysis failed: {}", style("✗").red(), message)
        }
    }
}

/// Print the diagnostics list verbatim
pub fn print_warnings(warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }
    println!();
    println!(
        "{} {} warning(s):",
        style("⚠").yellow(),
        style(warnings.len()).yellow().bold()
    );
    for warning in warnings {
        println!("  - {}", warning);
    }
}

/// Write CSV records to stdout
pub fn write_csv<I, R>(header: &[String], records: I) -> Result<()>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record(header).into_diagnostic()?;
    for record in records {
        writer
            .write_record(record.into_iter().collect::<Vec<_>>())
            .into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}
