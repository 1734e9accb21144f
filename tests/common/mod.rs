//! Shared test helpers for integration tests
//!
//! Builders for leaf position exports plus a sandboxed `mlca` command.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to get an mlca command isolated from the user's config file
pub fn mlca(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("mlca"));
    cmd.env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path())
        .env_remove("MLCA_CONFIG")
        .env_remove("MLCA_TOLERANCE")
        .env_remove("RUST_LOG");
    cmd
}

/// One bank row: name, values, trailing unit cell
pub fn bank_row<S: AsRef<str>>(bank: &str, values: &[S]) -> String {
    let mut cells = vec![bank.to_string()];
    cells.extend(values.iter().map(|v| v.as_ref().to_string()));
    cells.push("mm".to_string());
    cells.join(",")
}

/// A bank row with every leaf at the same position
pub fn uniform_row(bank: &str, value: f64, count: usize) -> String {
    let values: Vec<String> = (0..count).map(|_| value.to_string()).collect();
    bank_row(bank, &values)
}

/// A complete run block: header plus the given rows
pub fn run_block(rows: &[String]) -> String {
    let mut lines = vec!["Name,Value".to_string()];
    lines.extend(rows.iter().cloned());
    lines.join("\n")
}

/// Join run blocks into an export
pub fn export(blocks: &[String]) -> String {
    let mut text = blocks.join("\n");
    text.push('\n');
    text
}

/// Two runs of "Left MLC Bank +20": leaf 1 at 19.9 then 20.1, the rest at 20.0
pub fn two_run_export() -> String {
    let run = |first: &str| {
        let mut values = vec![first.to_string()];
        values.extend((1..80).map(|_| "20.0".to_string()));
        run_block(&[bank_row("Left MLC Bank +20", &values)])
    };
    export(&[run("19.9"), run("20.1")])
}

/// Write an export into a temp directory
pub fn write_export(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}
