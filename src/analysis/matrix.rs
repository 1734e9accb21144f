//! Matrix builder - dense bank × leaf × run arena
//!
//! Cells live in one flat vector addressed by explicit
//! `(bank, element, run)` indices. Banks are ordered by first sighting
//! across runs; a bank first seen in a later run keeps missing cells for
//! the earlier runs.

use crate::analysis::parser::{Measurement, ParsedRuns, MISSING};
use crate::core::error::{push_warning, Warning};

/// Dense measurement matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    banks: Vec<String>,
    element_count: usize,
    run_count: usize,
    cells: Vec<Measurement>,
}

impl Matrix {
    /// Allocate a matrix pre-filled with the missing sentinel
    pub fn new(banks: Vec<String>, element_count: usize, run_count: usize) -> Self {
        let cells = vec![MISSING; banks.len() * element_count * run_count];
        Self {
            banks,
            element_count,
            run_count,
            cells,
        }
    }

    /// Bank names in discovery order
    pub fn banks(&self) -> &[String] {
        &self.banks
    }

    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn run_count(&self) -> usize {
        self.run_count
    }

    /// Position of a bank in discovery order
    pub fn bank_index(&self, bank: &str) -> Option<usize> {
        self.banks.iter().position(|b| b == bank)
    }

    fn offset(&self, bank: usize, element: usize, run: usize) -> usize {
        (bank * self.element_count + element) * self.run_count + run
    }

    /// Cell value; out-of-range indices read as missing
    pub fn get(&self, bank: usize, element: usize, run: usize) -> Measurement {
        if bank >= self.banks.len() || element >= self.element_count || run >= self.run_count {
            return MISSING;
        }
        self.cells[self.offset(bank, element, run)]
    }

    /// All runs for one leaf, in run order
    pub fn series(&self, bank: usize, element: usize) -> &[Measurement] {
        if bank >= self.banks.len() || element >= self.element_count {
            return &[];
        }
        let start = self.offset(bank, element, 0);
        &self.cells[start..start + self.run_count]
    }

    fn fill_run(&mut self, bank: usize, run: usize, values: &[Measurement]) {
        for element in 0..self.element_count {
            let offset = self.offset(bank, element, run);
            self.cells[offset] = values.get(element).copied().flatten();
        }
    }
}

/// Reorganize parsed run blocks into the dense matrix
pub fn build_matrix(
    parsed: &ParsedRuns,
    element_count: usize,
    warnings: &mut Vec<Warning>,
) -> Matrix {
    let mut banks: Vec<String> = Vec::new();
    for run in &parsed.runs {
        for row in &run.banks {
            if !banks.contains(&row.bank) {
                banks.push(row.bank.clone());
            }
        }
    }

    let run_count = parsed.run_count();
    let mut matrix = Matrix::new(banks, element_count, run_count);

    let mut misshapen = vec![false; matrix.banks().len()];
    for (run_idx, run) in parsed.runs.iter().enumerate() {
        for row in &run.banks {
            let Some(bank_idx) = matrix.bank_index(&row.bank) else {
                continue;
            };
            if row.values.len() != element_count && !misshapen[bank_idx] {
                misshapen[bank_idx] = true;
                push_warning(
                    warnings,
                    Warning::MatrixShape {
                        bank: row.bank.clone(),
                        elements: row.values.len(),
                        runs: run_count,
                        expected_elements: element_count,
                        expected_runs: run_count,
                    },
                );
            }
            matrix.fill_run(bank_idx, run_idx, &row.values);
        }
    }

    for bank in matrix.banks().to_vec() {
        for (run_idx, run) in parsed.runs.iter().enumerate() {
            if run.get(&bank).is_none() {
                push_warning(
                    warnings,
                    Warning::BankMissingFromRun {
                        bank: bank.clone(),
                        run: run_idx + 1,
                    },
                );
            }
        }
    }

    tracing::debug!(
        banks = matrix.banks().len(),
        runs = run_count,
        "built measurement matrix"
    );
    matrix
}
