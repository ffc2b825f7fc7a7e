//! Integration tests for the `fathom` binary entry point.
//!
//! Covers exit codes and the user-facing streams of each command.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const PROGRAM: &str = "(begin (lit 1) (lit 2) (lit 3))\n";

fn workspace() -> anyhow::Result<(TempDir, std::path::PathBuf)> {
    let dir = TempDir::new()?;
    let path = dir.path().join("program.sexp");
    fs::write(&path, PROGRAM)?;
    Ok((dir, path))
}

#[test]
fn version_flag_succeeds() {
    let mut command = cargo_bin_cmd!("fathom");
    command.arg("--version");
    command.assert().success().stdout(contains("fathom"));
}

#[test]
fn missing_arguments_are_usage_errors() {
    let mut command = cargo_bin_cmd!("fathom");
    command.args(["search", "(lit _)"]);
    command.assert().code(2).stderr(contains("Usage"));
}

#[test]
fn search_reports_each_occurrence() -> anyhow::Result<()> {
    let (_dir, path) = workspace()?;
    let mut command = cargo_bin_cmd!("fathom");
    command.arg("search").arg("(lit $_)").arg(&path);
    command
        .assert()
        .success()
        .stdout(contains(":1:8: (lit 1)").and(contains(":1:24: (lit 3)")));
    Ok(())
}

#[test]
fn malformed_patterns_fail_with_offset() -> anyhow::Result<()> {
    let (_dir, path) = workspace()?;
    let mut command = cargo_bin_cmd!("fathom");
    command.arg("search").arg("(lit _) )").arg(&path);
    command
        .assert()
        .code(1)
        .stderr(contains("invalid pattern"));
    Ok(())
}

#[test]
fn trace_flag_logs_pattern_evaluations() -> anyhow::Result<()> {
    let (_dir, path) = workspace()?;
    let mut command = cargo_bin_cmd!("fathom");
    command
        .args(["--log-filter", "fathom_syntax=trace", "search", "(lit 2)"])
        .arg(&path)
        .arg("--trace");
    command
        .assert()
        .success()
        .stdout(contains(":1:16: (lit 2)"))
        .stderr(contains("pattern evaluated").and(contains("matched=true")));
    Ok(())
}

#[test]
fn experiment_keeps_accepted_rewrites() -> anyhow::Result<()> {
    let (dir, path) = workspace()?;
    let mut command = cargo_bin_cmd!("fathom");
    command
        .args(["--log-format", "json", "--log-filter", "warn"])
        .arg("experiment")
        .arg("(lit $_)")
        .arg("(changed $1)")
        .arg(dir.path())
        .args(["--timeout", "10", "--policy", "sh", "-c"])
        .arg("! grep -q 'changed 2' \"$1\"")
        .args(["policy", "{file}"]);
    command
        .assert()
        .success()
        .stdout(contains("rewrote occurrences 1_3 of 3"));
    assert_eq!(
        fs::read_to_string(&path)?,
        "(begin (changed 1) (lit 2) (changed 3))\n"
    );
    let leftovers: Vec<_> = fs::read_dir(dir.path())?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("experiment_"))
        .collect();
    assert!(leftovers.is_empty());
    Ok(())
}
