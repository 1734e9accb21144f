//! Statistics engine - per-leaf accuracy and reproducibility
//!
//! Each (bank, leaf) pair is reduced independently:
//! - mean of the valid (non-missing) runs
//! - population standard deviation (divisor n)
//! - positional range (max - min)
//! - deviation = mean - nominal, flagged when |deviation| > tolerance

use serde::Serialize;

use crate::analysis::matrix::Matrix;
use crate::core::bank::{extract_nominal, leaf_id};
use crate::core::error::{push_warning, Warning};

/// First and second moments plus range of a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub std_dev: f64,
    pub range: f64,
}

/// Describe a sample; `None` for an empty one
///
/// A single observation has zero dispersion and zero range.
pub fn describe(values: &[f64]) -> Option<Moments> {
    let n = values.len();
    if n == 0 {
        return None;
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    if n == 1 {
        return Some(Moments {
            mean,
            std_dev: 0.0,
            range: 0.0,
        });
    }

    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    Some(Moments {
        mean,
        std_dev: variance.sqrt(),
        range: max - min,
    })
}

/// Statistics for one leaf; immutable once computed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafResult {
    /// Bank name as it appears in the export
    pub bank: String,

    /// Zero-based leaf position
    pub element: usize,

    /// Display identifier, e.g. `L1`
    pub leaf_id: String,

    /// Nominal setpoint in mm
    pub nominal: i32,

    /// Valid measurements in run order
    pub measurements: Vec<f64>,

    pub num_valid_runs: usize,

    pub mean: Option<f64>,

    /// Population standard deviation (reproducibility)
    pub std_dev: Option<f64>,

    /// Signed mean - nominal
    pub deviation: Option<f64>,

    /// Max - min across runs
    pub range: Option<f64>,

    pub out_of_tolerance: bool,
}

impl LeafResult {
    /// Build the result for one leaf from its run series
    pub fn from_series(
        bank: &str,
        element: usize,
        nominal: i32,
        series: &[Option<f64>],
        tolerance_mm: f64,
    ) -> Self {
        let measurements: Vec<f64> = series.iter().flatten().copied().collect();
        let moments = describe(&measurements);
        let deviation = moments.map(|m| m.mean - f64::from(nominal));

        Self {
            bank: bank.to_string(),
            element,
            leaf_id: leaf_id(bank, element),
            nominal,
            num_valid_runs: measurements.len(),
            measurements,
            mean: moments.map(|m| m.mean),
            std_dev: moments.map(|m| m.std_dev),
            deviation,
            range: moments.map(|m| m.range),
            out_of_tolerance: is_out_of_tolerance(deviation, tolerance_mm),
        }
    }

    /// Absolute deviation from nominal, when defined
    pub fn abs_deviation(&self) -> Option<f64> {
        self.deviation.map(f64::abs)
    }
}

/// Strictly greater than tolerance; an undefined deviation is never flagged
pub fn is_out_of_tolerance(deviation: Option<f64>, tolerance_mm: f64) -> bool {
    deviation.is_some_and(|d| d.abs() > tolerance_mm)
}

/// Compute one result per (bank, leaf), banks in discovery order
///
/// Banks whose name carries no nominal setpoint are skipped with a warning.
pub fn compute_statistics(
    matrix: &Matrix,
    tolerance_mm: f64,
    warnings: &mut Vec<Warning>,
) -> Vec<LeafResult> {
    let mut results = Vec::with_capacity(matrix.banks().len() * matrix.element_count());

    for (bank_idx, bank) in matrix.banks().iter().enumerate() {
        let Some(nominal) = extract_nominal(bank) else {
            push_warning(warnings, Warning::NominalUnavailable { bank: bank.clone() });
            continue;
        };

        results.extend((0..matrix.element_count()).map(|element| {
            LeafResult::from_series(
                bank,
                element,
                nominal,
                matrix.series(bank_idx, element),
                tolerance_mm,
            )
        }));
    }

    if results.is_empty() && !matrix.banks().is_empty() {
        push_warning(warnings, Warning::EmptyAnalysis);
    }

    tracing::debug!(
        results = results.len(),
        out_of_tolerance = results.iter().filter(|r| r.out_of_tolerance).count(),
        "computed leaf statistics"
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_describe_empty() {
        assert_eq!(describe(&[]), None);
    }

    #[test]
    fn test_describe_single_has_zero_dispersion() {
        let m = describe(&[-59.5]).unwrap();
        assert_eq!(m.mean, -59.5);
        assert_eq!(m.std_dev, 0.0);
        assert_eq!(m.range, 0.0);
    }

    #[test]
    fn test_describe_population_std_dev() {
        // Population std of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 2
        let m = describe(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!(approx(m.mean, 5.0));
        assert!(approx(m.std_dev, 2.0));
        assert!(approx(m.range, 7.0));
    }

    #[test]
    fn test_leaf_basic_calculations() {
        let series = [Some(20.1), Some(20.3), Some(19.9), Some(20.0), Some(20.2)];
        let r = LeafResult::from_series("Left MLC Bank +20", 0, 20, &series, 1.0);
        assert_eq!(r.leaf_id, "L1");
        assert!(approx(r.mean.unwrap(), 20.1));
        assert!(approx(r.deviation.unwrap(), 0.1));
        assert!(approx(r.range.unwrap(), 0.4));
        assert!(!r.out_of_tolerance);

        let series = [Some(18.0), Some(18.5), Some(19.0), Some(18.2), Some(18.8)];
        let r = LeafResult::from_series("Left MLC Bank +20", 1, 20, &series, 1.0);
        assert_eq!(r.leaf_id, "L2");
        assert!(approx(r.mean.unwrap(), 18.5));
        assert!(approx(r.deviation.unwrap(), -1.5));
        assert!(r.out_of_tolerance);
    }

    #[test]
    fn test_leaf_single_measurement() {
        let r = LeafResult::from_series("Right MLC Bank -60", 0, -60, &[Some(-59.5), None], 1.0);
        assert_eq!(r.num_valid_runs, 1);
        assert_eq!(r.std_dev, Some(0.0));
        assert_eq!(r.range, Some(0.0));
        assert!(approx(r.deviation.unwrap(), 0.5));
        assert!(!r.out_of_tolerance);
    }

    #[test]
    fn test_leaf_no_valid_measurements() {
        let r = LeafResult::from_series("Left MLC Bank 100", 0, 100, &[None, None], 0.0);
        assert_eq!(r.num_valid_runs, 0);
        assert!(r.measurements.is_empty());
        assert_eq!(r.mean, None);
        assert_eq!(r.std_dev, None);
        assert_eq!(r.deviation, None);
        assert_eq!(r.range, None);
        assert!(!r.out_of_tolerance);
    }

    #[test]
    fn test_tolerance_boundary_is_strict() {
        assert!(!is_out_of_tolerance(Some(1.0), 1.0));
        assert!(!is_out_of_tolerance(Some(-1.0), 1.0));
        assert!(is_out_of_tolerance(Some(2.0), 1.0));
        assert!(is_out_of_tolerance(Some(-2.0), 1.0));
        assert!(!is_out_of_tolerance(Some(0.0), 0.0));
        assert!(!is_out_of_tolerance(None, 0.0));
    }

    #[test]
    fn test_unknown_nominal_bank_skipped() {
        let matrix = Matrix::new(vec!["Mystery Bank".to_string()], 2, 1);
        let mut warnings = Vec::new();
        let results = compute_statistics(&matrix, 1.0, &mut warnings);

        assert!(results.is_empty());
        assert_eq!(
            warnings,
            vec![
                Warning::NominalUnavailable {
                    bank: "Mystery Bank".to_string()
                },
                Warning::EmptyAnalysis,
            ]
        );
    }

    #[test]
    fn test_one_result_per_leaf() {
        let matrix = Matrix::new(
            vec!["Left MLC Bank +20".to_string(), "Right MLC Bank -20".to_string()],
            80,
            2,
        );
        let results = compute_statistics(&matrix, 1.0, &mut Vec::new());
        assert_eq!(results.len(), 160);
        assert_eq!(results[0].leaf_id, "L1");
        assert_eq!(results[80].leaf_id, "R1");
        assert_eq!(results[159].leaf_id, "R80");
        assert_eq!(results[80].nominal, -20);
    }
}
