//! End-to-end pipeline tests - parse, matrix, statistics, rankings

mod common;

use common::{bank_row, export, run_block, two_run_export, uniform_row, write_export};
use mlca::analysis::{
    analyze_file, analyze_str, join_analysis, spawn_analysis, AnalysisOptions, Metric,
    ProgressEvent,
};
use mlca::core::{AnalysisError, Warning};
use std::sync::mpsc;
use tempfile::TempDir;

const EPS: f64 = 1e-9;

fn close(actual: Option<f64>, expected: f64) -> bool {
    actual.is_some_and(|v| (v - expected).abs() < EPS)
}

// ============================================================================
// Statistics
// ============================================================================

#[test]
fn test_two_run_export_leaf_one() {
    let bundle = analyze_str(&two_run_export(), &AnalysisOptions::with_tolerance(1.0)).unwrap();

    assert_eq!(bundle.run_count, 2);
    assert_eq!(bundle.banks, vec!["Left MLC Bank +20".to_string()]);
    assert_eq!(bundle.results.len(), 80);

    let l1 = &bundle.results[0];
    assert_eq!(l1.leaf_id, "L1");
    assert_eq!(l1.nominal, 20);
    assert_eq!(l1.num_valid_runs, 2);
    assert!(close(l1.mean, 20.0));
    assert!(close(l1.deviation, 0.0));
    assert!(close(l1.std_dev, 0.1));
    assert!(close(l1.range, 0.2));
    assert!(!l1.out_of_tolerance);
    assert!(bundle.warnings.is_empty());
}

#[test]
fn test_zero_tolerance_with_zero_deviation_is_not_flagged() {
    let bundle = analyze_str(&two_run_export(), &AnalysisOptions::with_tolerance(0.0)).unwrap();
    assert_eq!(bundle.results[0].deviation, Some(0.0));
    assert!(bundle.results.iter().all(|r| !r.out_of_tolerance));
    assert!(bundle.out_of_tolerance().next().is_none());
}

#[test]
fn test_single_run_has_zero_spread() {
    let text = export(&[run_block(&[uniform_row("Right MLC Bank -60", -60.5, 80)])]);
    let bundle = analyze_str(&text, &AnalysisOptions::default()).unwrap();

    let r1 = &bundle.results[0];
    assert_eq!(r1.leaf_id, "R1");
    assert_eq!(r1.nominal, -60);
    assert!(close(r1.deviation, -0.5));
    assert_eq!(r1.std_dev, Some(0.0));
    assert_eq!(r1.range, Some(0.0));
    assert!(!r1.out_of_tolerance);
}

#[test]
fn test_out_of_tolerance_is_strict() {
    let text = export(&[run_block(&[
        uniform_row("Left MLC Bank +60", 61.0, 80),
        uniform_row("Right MLC Bank +60", 61.5, 80),
    ])]);
    let bundle = analyze_str(&text, &AnalysisOptions::with_tolerance(1.0)).unwrap();

    let flagged: Vec<&str> = bundle.out_of_tolerance().map(|r| r.bank.as_str()).collect();
    assert_eq!(flagged.len(), 80);
    assert!(flagged.iter().all(|b| *b == "Right MLC Bank +60"));
}

#[test]
fn test_bank_100_uses_nominal_100() {
    let text = export(&[run_block(&[uniform_row("Left MLC Bank 100", 100.2, 80)])]);
    let bundle = analyze_str(&text, &AnalysisOptions::default()).unwrap();
    assert_eq!(bundle.results[0].nominal, 100);
    assert!(close(bundle.results[0].deviation, 0.2));
}

// ============================================================================
// Recoverable input problems
// ============================================================================

#[test]
fn test_short_row_pads_with_missing() {
    let values: Vec<String> = (0..60).map(|_| "20.0".to_string()).collect();
    let text = export(&[run_block(&[bank_row("Left MLC Bank +20", &values)])]);
    let bundle = analyze_str(&text, &AnalysisOptions::default()).unwrap();

    assert!(bundle.warnings.iter().any(|w| matches!(
        w,
        Warning::CountMismatch {
            expected: 80,
            found: 60,
            ..
        }
    )));
    assert_eq!(bundle.results[59].num_valid_runs, 1);
    for r in &bundle.results[60..80] {
        assert_eq!(r.num_valid_runs, 0);
        assert_eq!(r.mean, None);
        assert_eq!(r.std_dev, None);
        assert!(!r.out_of_tolerance);
    }
    assert_eq!(bundle.rankings.inaccurate.len(), 60);
}

#[test]
fn test_malformed_value_is_missing() {
    let mut values: Vec<String> = (0..80).map(|_| "20.0".to_string()).collect();
    values[4] = "abc".to_string();
    let text = export(&[
        run_block(&[bank_row("Left MLC Bank +20", &values)]),
        run_block(&[uniform_row("Left MLC Bank +20", 20.2, 80)]),
    ]);
    let bundle = analyze_str(&text, &AnalysisOptions::default()).unwrap();

    assert!(bundle
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::MalformedValue { element: 5, token, .. } if token == "abc")));
    let l5 = &bundle.results[4];
    assert_eq!(l5.num_valid_runs, 1);
    assert_eq!(l5.std_dev, Some(0.0));
    assert_eq!(bundle.results[3].num_valid_runs, 2);
}

#[test]
fn test_bank_appearing_late_is_missing_for_earlier_runs() {
    let text = export(&[
        run_block(&[uniform_row("Left MLC Bank +20", 20.0, 80)]),
        run_block(&[
            uniform_row("Left MLC Bank +20", 20.0, 80),
            uniform_row("Right MLC Bank +20", 20.3, 80),
        ]),
    ]);
    let bundle = analyze_str(&text, &AnalysisOptions::default()).unwrap();

    assert_eq!(
        bundle.banks,
        vec![
            "Left MLC Bank +20".to_string(),
            "Right MLC Bank +20".to_string()
        ]
    );
    assert!(bundle.warnings.iter().any(
        |w| matches!(w, Warning::BankMissingFromRun { bank, .. } if bank == "Right MLC Bank +20")
    ));
    let r1 = bundle.results.iter().find(|r| r.leaf_id == "R1").unwrap();
    assert_eq!(r1.num_valid_runs, 1);
    assert!(close(r1.mean, 20.3));
}

#[test]
fn test_data_without_any_header_is_one_run() {
    let text = export(&[uniform_row("Left MLC Bank +20", 20.4, 80)]);
    let bundle = analyze_str(&text, &AnalysisOptions::default()).unwrap();

    assert_eq!(bundle.run_count, 1);
    assert_eq!(
        bundle.warnings,
        vec![Warning::DataBeforeHeader {
            bank: "Left MLC Bank +20".to_string(),
            row: 1,
        }]
    );
    assert_eq!(bundle.results.len(), 80);
    assert!(bundle.results.iter().all(|r| r.num_valid_runs == 1));
    assert!(close(bundle.results[0].deviation, 0.4));
}

#[test]
fn test_unknown_rows_are_ignored() {
    let text = export(&[run_block(&[
        "Machine,TrueBeam".to_string(),
        uniform_row("Left MLC Bank -20", -20.0, 80),
        "Comment,,,".to_string(),
    ])]);
    let bundle = analyze_str(&text, &AnalysisOptions::default()).unwrap();
    assert_eq!(bundle.banks.len(), 1);
    assert!(bundle.warnings.is_empty());
}

// ============================================================================
// Fatal conditions
// ============================================================================

#[test]
fn test_no_runs_is_fatal() {
    let err = analyze_str("Machine,TrueBeam\nDate,2024-01-01\n", &AnalysisOptions::default())
        .unwrap_err();
    assert!(matches!(err, AnalysisError::NoRuns));
}

#[test]
fn test_empty_input_is_fatal() {
    let err = analyze_str("", &AnalysisOptions::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::NoRuns));
}

#[test]
fn test_negative_tolerance_is_fatal() {
    let err = analyze_str(&two_run_export(), &AnalysisOptions::with_tolerance(-0.5)).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidTolerance { .. }));
}

#[test]
fn test_missing_file_is_io_error() {
    let tmp = TempDir::new().unwrap();
    let err = analyze_file(&tmp.path().join("absent.csv"), &AnalysisOptions::default())
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Io { .. }));
}

#[test]
fn test_header_without_banks_is_an_empty_run() {
    let bundle = analyze_str("Name,Value\n", &AnalysisOptions::default()).unwrap();
    assert_eq!(bundle.run_count, 1);
    assert!(bundle.banks.is_empty());
    assert!(bundle.results.is_empty());
    assert!(bundle.warnings.is_empty());
}

// ============================================================================
// Rankings and determinism
// ============================================================================

#[test]
fn test_rankings_order_by_magnitude() {
    let mut values: Vec<String> = (0..80).map(|_| "20.0".to_string()).collect();
    values[9] = "18.5".to_string();
    values[19] = "20.7".to_string();
    let text = export(&[run_block(&[bank_row("Left MLC Bank +20", &values)])]);
    let bundle = analyze_str(&text, &AnalysisOptions::default()).unwrap();

    let top = bundle.rankings.top(Metric::Deviation, 2);
    assert_eq!(top[0].leaf_id, "L10");
    assert!((top[0].value - 1.5).abs() < EPS);
    assert_eq!(top[1].leaf_id, "L20");
    // Ties at zero keep discovery order
    assert_eq!(bundle.rankings.inaccurate[2].leaf_id, "L1");
}

#[test]
fn test_repeated_analysis_is_identical() {
    let text = export(&[
        run_block(&[
            uniform_row("Left MLC Bank +20", 20.1, 80),
            uniform_row("Right MLC Bank -60", -59.4, 80),
        ]),
        run_block(&[
            uniform_row("Left MLC Bank +20", 19.8, 80),
            uniform_row("Right MLC Bank -60", -59.9, 80),
        ]),
    ]);
    let options = AnalysisOptions::default();
    let first = analyze_str(&text, &options).unwrap();
    let second = analyze_str(&text, &options).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// Background execution
// ============================================================================

#[test]
fn test_spawned_analysis_reports_progress() {
    let tmp = TempDir::new().unwrap();
    let path = write_export(&tmp, "export.csv", &two_run_export());

    let (tx, rx) = mpsc::channel();
    let handle = spawn_analysis(path, AnalysisOptions::default(), tx);
    let events: Vec<ProgressEvent> = rx.iter().collect();
    let bundle = join_analysis(handle).unwrap();

    assert_eq!(bundle.results.len(), 80);
    assert!(matches!(events.first(), Some(ProgressEvent::Started { .. })));
    assert!(events.contains(&ProgressEvent::Parsed { runs: 2 }));
    assert!(matches!(events.last(), Some(ProgressEvent::Finished { warnings: 0 })));
}

#[test]
fn test_spawned_analysis_reports_failure() {
    let tmp = TempDir::new().unwrap();
    let path = write_export(&tmp, "export.csv", "nothing useful\n");

    let (tx, rx) = mpsc::channel();
    let handle = spawn_analysis(path, AnalysisOptions::default(), tx);
    let events: Vec<ProgressEvent> = rx.iter().collect();

    assert!(matches!(join_analysis(handle), Err(AnalysisError::NoRuns)));
    assert!(matches!(events.last(), Some(ProgressEvent::Failed { .. })));
}
