// crates/secret-compare-cli/tests/cli.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests for the secret-compare binary.
// Purpose: Ensure exit codes and output never reveal secret material.
// Dependencies: secret-compare-cli binary
// ============================================================================
//! ## Overview
//! Runs the binary with secrets in environment variables and checks exit
//! codes, audit output, config validation, and timing reports.
//!
//! Security posture: secrets must never appear on stdout or stderr.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsStr;
use std::fs;
#[cfg(unix)]
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use serde_json::Value;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn secret_compare_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_secret-compare"))
}

fn base_command(dir: &Path) -> Command {
    let mut command = Command::new(secret_compare_bin());
    command.current_dir(dir).env_remove("SECRET_COMPARE_CONFIG");
    command
}

fn run_compare(dir: &Path, left: Option<&str>, right: Option<&str>, encoding: &str) -> Output {
    run_compare_os(dir, left.map(OsStr::new), right.map(OsStr::new), encoding)
}

fn run_compare_os(
    dir: &Path,
    left: Option<&OsStr>,
    right: Option<&OsStr>,
    encoding: &str,
) -> Output {
    let mut command = base_command(dir);
    command
        .args(["compare", "--left-env", "SC_LEFT", "--right-env", "SC_RIGHT"])
        .args(["--encoding", encoding])
        .env_remove("SC_LEFT")
        .env_remove("SC_RIGHT");
    if let Some(left) = left {
        command.env("SC_LEFT", left);
    }
    if let Some(right) = right {
        command.env("SC_RIGHT", right);
    }
    command.output().expect("run secret-compare")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn compare_exits_zero_on_match() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_compare(dir.path(), Some("secret123"), Some("secret123"), "utf8");
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}

#[test]
fn compare_exits_one_on_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    for (left, right) in [("secret123", "secret124"), ("short", "muchlongerstring")] {
        let output = run_compare(dir.path(), Some(left), Some(right), "utf8");
        assert_eq!(output.status.code(), Some(1));
        assert!(output.stdout.is_empty());
        assert!(output.stderr.is_empty());
    }
}

#[test]
fn compare_treats_empty_and_unset_as_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(run_compare(dir.path(), Some(""), Some(""), "utf8").status.code(), Some(1));
    assert_eq!(run_compare(dir.path(), None, Some("token"), "utf8").status.code(), Some(1));
    assert_eq!(run_compare(dir.path(), None, None, "utf8").status.code(), Some(1));
}

#[test]
fn compare_decodes_hex_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_compare(dir.path(), Some("DEADBEEF"), Some("deadbeef"), "hex");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn compare_audits_decode_failures_without_secret_content() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_compare(dir.path(), Some("zz-top-secret"), Some("deadbeef"), "hex");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    let event: Value = serde_json::from_str(stderr.trim()).unwrap();
    assert_eq!(event["event"], "secret_compare_failure");
    assert_eq!(event["side"], "left");
    assert_eq!(event["reason"], "hex_decode_failed");
    assert!(!stderr.contains("top-secret"));
    assert!(!stderr.contains("deadbeef"));
}

#[cfg(unix)]
#[test]
fn compare_matches_identical_non_utf8_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let raw = OsStr::from_bytes(&[0xff, 0xfe, 0x41, 0x42]);
    let output = run_compare_os(dir.path(), Some(raw), Some(raw), "utf8");
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stderr.is_empty());

    let other = OsStr::from_bytes(&[0xff, 0xfe, 0x41, 0x43]);
    let output = run_compare_os(dir.path(), Some(raw), Some(other), "utf8");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stderr.is_empty());
}

#[cfg(unix)]
#[test]
fn compare_audits_non_utf8_encoded_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let raw = OsStr::from_bytes(&[0xff, 0xfe, 0x41, 0x42]);
    let output = run_compare_os(dir.path(), Some(OsStr::new("deadbeef")), Some(raw), "hex");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    let event: Value = serde_json::from_str(stderr.trim()).unwrap();
    assert_eq!(event["side"], "right");
    assert_eq!(event["reason"], "utf8_decode_failed");
}

#[test]
fn compare_honors_silent_audit_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("secret-compare.toml"), "[audit]\nsink = \"none\"\n").unwrap();
    let output = run_compare(dir.path(), Some("zz"), Some("deadbeef"), "hex");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stderr.is_empty());
}

#[test]
fn config_validate_reports_success_and_failure() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.toml");
    fs::write(&good, "[comparator]\nfixed_width = 32\n").unwrap();
    let output = base_command(dir.path())
        .args(["config", "validate", "--config"])
        .arg(&good)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8(output.stdout).unwrap().trim(), "Config valid.");

    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "[comparator]\nfixed_width = 0\n").unwrap();
    let output = base_command(dir.path())
        .args(["config", "validate", "--config"])
        .arg(&bad)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8(output.stderr).unwrap().contains("fixed_width"));
}

#[test]
fn timing_prints_report_for_every_probe() {
    let dir = tempfile::tempdir().unwrap();
    let output = base_command(dir.path())
        .args(["timing", "--trials", "8", "--secret-len", "16"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["trials"], 8);
    assert_eq!(report["secret_len"], 16);
    let probes: Vec<&str> = report["samples"]
        .as_array()
        .unwrap()
        .iter()
        .map(|sample| sample["probe"].as_str().unwrap())
        .collect();
    assert_eq!(probes, ["equal", "first_byte", "middle_byte", "last_byte", "length_mismatch"]);
}

#[test]
fn timing_rejects_zero_trials() {
    let dir = tempfile::tempdir().unwrap();
    let output = base_command(dir.path()).args(["timing", "--trials", "0"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8(output.stderr).unwrap().contains("timing.trials"));
}
