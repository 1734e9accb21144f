//! Block parser - recovers per-run bank vectors from the delimited export
//!
//! The export repeats one block per test run. A `Name,Value` row opens a
//! block; each recognized bank row inside it carries one value per leaf,
//! terminated by the `mm` unit cell. Everything else is report chrome and
//! is skipped.

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::core::config::ParserConfig;
use crate::core::error::{push_warning, AnalysisError, Warning};

/// One leaf reading for one run; `None` is the missing sentinel
pub type Measurement = Option<f64>;

/// Missing-value sentinel
pub const MISSING: Measurement = None;

/// Values of one bank row, always `element_count` long
#[derive(Debug, Clone, PartialEq)]
pub struct BankRow {
    pub bank: String,
    pub values: Vec<Measurement>,
}

/// All bank rows seen inside one run block, in row order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunBlock {
    pub banks: Vec<BankRow>,
}

impl RunBlock {
    /// Values for a bank in this run
    pub fn get(&self, bank: &str) -> Option<&[Measurement]> {
        self.banks
            .iter()
            .find(|row| row.bank == bank)
            .map(|row| row.values.as_slice())
    }

    /// Store a bank row; returns true if it replaced an earlier row
    fn insert(&mut self, bank: &str, values: Vec<Measurement>) -> bool {
        if let Some(existing) = self.banks.iter_mut().find(|row| row.bank == bank) {
            existing.values = values;
            true
        } else {
            self.banks.push(BankRow {
                bank: bank.to_string(),
                values,
            });
            false
        }
    }
}

/// Parser output: run blocks in file order plus warnings
#[derive(Debug, Clone, Default)]
pub struct ParsedRuns {
    pub runs: Vec<RunBlock>,
    pub warnings: Vec<Warning>,
}

impl ParsedRuns {
    /// Number of run blocks recognized
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }
}

/// Parse the full export text into run blocks
///
/// Malformed values and structural problems become warnings. The reader is
/// flexible over in-memory text, so ragged rows and stray quotes never fail;
/// the `Err` path only guards the csv reader contract.
pub fn parse_blocks(text: &str, config: &ParserConfig) -> Result<ParsedRuns, AnalysisError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut parsed = ParsedRuns::default();
    let mut current: Option<RunBlock> = None;

    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let row = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 1);

        let first = match record.get(0) {
            Some(cell) if !cell.is_empty() => cell,
            _ => continue,
        };

        if config.is_header(first, record.get(1)) {
            if let Some(run) = current.take() {
                parsed.runs.push(run);
            }
            current = Some(RunBlock::default());
            continue;
        }

        if !config.is_bank(first) {
            continue;
        }

        if current.is_none() {
            push_warning(
                &mut parsed.warnings,
                Warning::DataBeforeHeader {
                    bank: first.to_string(),
                    row,
                },
            );
        }
        let run_number = parsed.runs.len() + 1;
        let values = parse_bank_row(&record, first, run_number, row, config, &mut parsed.warnings);

        let run = current.get_or_insert_with(RunBlock::default);
        if run.insert(first, values) {
            push_warning(
                &mut parsed.warnings,
                Warning::DuplicateBankRow {
                    run: run_number,
                    bank: first.to_string(),
                    row,
                },
            );
        }
    }

    if let Some(run) = current.take() {
        parsed.runs.push(run);
    }

    tracing::debug!(
        runs = parsed.runs.len(),
        warnings = parsed.warnings.len(),
        "parsed run blocks"
    );
    Ok(parsed)
}

/// Collect the numeric cells of a bank row into a fixed-width vector
fn parse_bank_row(
    record: &StringRecord,
    bank: &str,
    run: usize,
    row: usize,
    config: &ParserConfig,
    warnings: &mut Vec<Warning>,
) -> Vec<Measurement> {
    let expected = config.element_count;
    let mut values = vec![MISSING; expected];

    let candidates: Vec<&str> = record
        .iter()
        .skip(1)
        .take_while(|cell| !config.is_unit(cell))
        .filter(|cell| !cell.is_empty())
        .collect();

    if candidates.is_empty() {
        push_warning(
            warnings,
            Warning::NoValues {
                run,
                bank: bank.to_string(),
                row,
            },
        );
        return values;
    }

    for (element, token) in candidates.iter().take(expected).enumerate() {
        match parse_measurement(token) {
            Some(value) => values[element] = value,
            None => push_warning(
                warnings,
                Warning::MalformedValue {
                    run,
                    bank: bank.to_string(),
                    element: element + 1,
                    token: token.to_string(),
                },
            ),
        }
    }

    if candidates.len() > expected {
        push_warning(
            warnings,
            Warning::Truncated {
                run,
                bank: bank.to_string(),
                expected,
                found: candidates.len(),
            },
        );
    } else if candidates.len() < expected {
        push_warning(
            warnings,
            Warning::CountMismatch {
                run,
                bank: bank.to_string(),
                expected,
                found: candidates.len(),
            },
        );
    }

    values
}

/// Parse one cell; `None` means unparsable, `Some(MISSING)` a literal NaN
fn parse_measurement(token: &str) -> Option<Measurement> {
    let value: f64 = token.parse().ok()?;
    if value.is_nan() {
        Some(MISSING)
    } else {
        Some(Some(value))
    }
}
