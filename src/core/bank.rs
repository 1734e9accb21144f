//! Bank identifiers - side and nominal setpoint encoded in the bank name

use serde::{Deserialize, Serialize};

/// Which carriage a bank belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Classify a bank name: anything mentioning "left" (any case) is Left
    pub fn of_bank(bank_name: &str) -> Self {
        if bank_name.to_ascii_lowercase().contains("left") {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Single-letter prefix used in leaf identifiers
    pub fn prefix(&self) -> char {
        match self {
            Side::Left => 'L',
            Side::Right => 'R',
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Leaf identifier, e.g. `L1` or `R80` (position is zero-based)
pub fn leaf_id(bank_name: &str, element: usize) -> String {
    format!("{}{}", Side::of_bank(bank_name).prefix(), element + 1)
}

/// Extract the nominal setpoint from a bank name
///
/// The name ends in a signed integer (`Left MLC Bank -60` → -60). The
/// unsigned `Bank 100` banks are also accepted when the number is not
/// trailing.
pub fn extract_nominal(bank_name: &str) -> Option<i32> {
    trailing_integer(bank_name.trim_end()).or_else(|| {
        if bank_name.contains("100") {
            Some(100)
        } else {
            None
        }
    })
}

fn trailing_integer(s: &str) -> Option<i32> {
    let digits_start = s
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;

    let start = match s[..digits_start].chars().last() {
        Some('+') | Some('-') => digits_start - 1,
        _ => digits_start,
    };

    s[start..].parse().ok()
}
