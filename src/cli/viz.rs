//! Terminal visualization of leaf metrics
//!
//! Heatmaps use one colored block per leaf; profiles use braille
//! graphics (drawille) with one polyline per bank.

use console::{style, Color};
use drawille::Canvas;

use crate::analysis::{LeafResult, Metric, MetricGrid};
use crate::core::Side;

/// Canvas height in pixels for leaf profiles
pub const PROFILE_HEIGHT: u32 = 48;

/// Width of the bank label column in heatmaps
const LABEL_WIDTH: usize = 20;

const MISSING_CELL: char = '·';

/// Shading from lowest to highest intensity
const SHADES: [char; 4] = ['░', '▒', '▓', '█'];

/// Heat level of one cell, 0 (best) to 3 (worst)
///
/// Deviation is judged against the tolerance; spread metrics against the
/// largest value in the grid.
pub fn heat_level(metric: Metric, value: f64, tolerance_mm: f64, grid_max: f64) -> usize {
    match metric {
        Metric::Deviation => {
            let magnitude = value.abs();
            if magnitude > tolerance_mm {
                3
            } else if magnitude > tolerance_mm * 0.75 {
                2
            } else if magnitude > tolerance_mm * 0.5 {
                1
            } else {
                0
            }
        }
        Metric::StdDev | Metric::Range => {
            if grid_max <= 0.0 {
                return 0;
            }
            let fraction = (value / grid_max).clamp(0.0, 1.0);
            ((fraction * 4.0) as usize).min(3)
        }
    }
}

fn level_color(level: usize) -> Color {
    match level {
        0 => Color::Green,
        1 => Color::Cyan,
        2 => Color::Yellow,
        _ => Color::Red,
    }
}

/// Render a bank × leaf heatmap
///
/// # Example Output
/// ```text
/// Heatmap: deviation (tolerance ±1.000 mm)
///                      1        10        20 ...
/// Left MLC Bank +20    ░░░░▒░░░░░░░░░░░░░█░ ...
/// ```
pub fn render_heatmap(grid: &MetricGrid, tolerance_mm: f64) -> String {
    let mut lines = Vec::new();

    if grid.banks.is_empty() {
        return "  (no banks)".to_string();
    }

    let grid_max = grid
        .bounds()
        .map(|(lo, hi)| lo.abs().max(hi.abs()))
        .unwrap_or(0.0);

    lines.push(match grid.metric {
        Metric::Deviation => format!(
            "Heatmap: {} (tolerance ±{:.3} mm)",
            grid.metric, tolerance_mm
        ),
        _ => format!("Heatmap: {} (max {:.3} mm)", grid.metric, grid_max),
    });

    lines.push(leaf_ruler(grid.element_count));

    for (row, bank) in grid.banks.iter().enumerate() {
        let mut line = format!("{:<width$} ", truncate_label(bank), width = LABEL_WIDTH);
        for cell in grid.row(row) {
            match cell {
                Some(v) => {
                    let level = heat_level(grid.metric, *v, tolerance_mm, grid_max);
                    line.push_str(&style(SHADES[level]).fg(level_color(level)).to_string());
                }
                None => line.push_str(&style(MISSING_CELL).dim().to_string()),
            }
        }
        lines.push(line);
    }

    lines.push(String::new());
    let legend = match grid.metric {
        Metric::Deviation => "≤50% tol, ≤75% tol, ≤100% tol, out of tolerance",
        _ => "<25%, <50%, <75%, ≥75% of max",
    };
    lines.push(format!(
        "Legend: {} {} {} {} = {}; {} = no data",
        SHADES[0], SHADES[1], SHADES[2], SHADES[3], legend, MISSING_CELL
    ));

    lines.join("\n")
}

/// Leaf numbers 1, 10, 20, ... each placed over its own column
fn leaf_ruler(element_count: usize) -> String {
    let mut ruler = " ".repeat(LABEL_WIDTH + 1);
    let mut cursor = 0;
    let marks = std::iter::once(1).chain((10..=element_count).step_by(10));
    for mark in marks.filter(|m| *m <= element_count) {
        let offset = mark - 1;
        if offset < cursor {
            continue;
        }
        let label = mark.to_string();
        ruler.push_str(&" ".repeat(offset - cursor));
        ruler.push_str(&label);
        cursor = offset + label.len();
    }
    ruler.trim_end().to_string()
}

fn truncate_label(s: &str) -> String {
    if s.chars().count() <= LABEL_WIDTH {
        s.to_string()
    } else {
        format!("{}…", s.chars().take(LABEL_WIDTH - 1).collect::<String>())
    }
}

/// Render a braille profile of one metric across the leaves of one side
///
/// Each bank on the side becomes one polyline; gaps in the data break the
/// line. Deviation profiles include ±tolerance guide lines.
pub fn render_profile(
    results: &[LeafResult],
    side: Side,
    metric: Metric,
    tolerance_mm: f64,
    element_count: usize,
) -> String {
    let side_results: Vec<&LeafResult> = results
        .iter()
        .filter(|r| Side::of_bank(&r.bank) == side)
        .collect();

    let values: Vec<f64> = side_results
        .iter()
        .filter_map(|r| metric.grid_value(r))
        .collect();
    if values.is_empty() || element_count == 0 {
        return format!("  (no {} data for {} side)", metric, side);
    }

    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if metric == Metric::Deviation {
        lo = lo.min(-tolerance_mm);
        hi = hi.max(tolerance_mm);
    } else {
        lo = lo.min(0.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        hi = lo + 1.0;
    }

    let width = (element_count as u32).saturating_mul(2).max(2);
    let height = PROFILE_HEIGHT;
    let mut canvas = Canvas::new(width, height);

    let x_of = |element: usize| (element as u32) * 2;
    let y_of = |value: f64| {
        let fraction = (value - lo) / (hi - lo);
        ((1.0 - fraction) * (height - 1) as f64).round() as u32
    };

    if metric == Metric::Deviation {
        for guide in [-tolerance_mm, 0.0, tolerance_mm] {
            let y = y_of(guide);
            for x in (0..width).step_by(4) {
                canvas.set(x, y);
            }
        }
    }

    let mut banks: Vec<&str> = Vec::new();
    for r in &side_results {
        if !banks.contains(&r.bank.as_str()) {
            banks.push(r.bank.as_str());
        }
    }

    for bank in &banks {
        let mut previous: Option<(u32, u32)> = None;
        for r in side_results.iter().filter(|r| r.bank == *bank) {
            match metric.grid_value(r) {
                Some(v) => {
                    let point = (x_of(r.element), y_of(v));
                    match previous {
                        Some((px, py)) => canvas.line(px, py, point.0, point.1),
                        None => canvas.set(point.0, point.1),
                    }
                    previous = Some(point);
                }
                None => previous = None,
            }
        }
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{} profile, {} side ({} bank(s)):\n",
        metric,
        side,
        banks.len()
    ));
    output.push_str(&canvas.frame());
    output.push_str(&format!(
        "\n  y: {:+.3} .. {:+.3} mm   x: leaf 1 .. {}",
        lo, hi, element_count
    ));
    if metric == Metric::Deviation {
        output.push_str(&format!("   guides: 0, ±{:.3} mm", tolerance_mm));
    }

    output
}
