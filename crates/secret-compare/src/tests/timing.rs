// crates/secret-compare/src/tests/timing.rs
// ============================================================================
// Module: Timing Harness Unit Tests
// Description: Unit tests for probe construction and report math.
// Purpose: Keep the harness deterministic where it can be.
// Dependencies: secret-compare timing module
// ============================================================================

//! ## Overview
//! Checks report shape and spread arithmetic. Latency values themselves are
//! never asserted.

use super::support::recording_comparator;
use crate::config::TimingConfig;
use crate::timing::Probe;
use crate::timing::TimingError;
use crate::timing::TimingSample;
use crate::timing::relative_spread;
use crate::timing::run_timing_harness;

fn sample(probe: Probe, mean_ns: f64) -> TimingSample {
    TimingSample {
        probe,
        mean_ns,
        min_ns: 0,
    }
}

#[test]
fn spread_only_considers_position_probes() {
    let samples = [
        sample(Probe::Equal, 1_000.0),
        sample(Probe::FirstByte, 100.0),
        sample(Probe::MiddleByte, 110.0),
        sample(Probe::LastByte, 125.0),
        sample(Probe::LengthMismatch, 5.0),
    ];
    let spread = relative_spread(&samples);
    assert!((spread - 0.25).abs() < 1e-9);
}

#[test]
fn spread_is_zero_without_positive_means() {
    assert!(relative_spread(&[]).abs() < f64::EPSILON);
    assert!(relative_spread(&[sample(Probe::FirstByte, 0.0)]).abs() < f64::EPSILON);
}

#[test]
fn harness_reports_every_probe() {
    let (comparator, sink) = recording_comparator();
    let config = TimingConfig {
        trials: 16,
        secret_len: 8,
        max_relative_spread: 1.0,
    };
    let report = run_timing_harness(&comparator, &config).unwrap();
    let probes: Vec<Probe> = report.samples.iter().map(|sample| sample.probe).collect();
    assert_eq!(probes, Probe::ALL);
    assert_eq!(report.trials, 16);
    assert_eq!(report.secret_len, 8);
    assert!(report.relative_spread >= 0.0);
    assert_eq!(report.within_tolerance, report.relative_spread <= 1.0);
    assert!(sink.events().is_empty());
}

#[test]
fn harness_handles_single_byte_secrets() {
    let (comparator, _sink) = recording_comparator();
    let config = TimingConfig {
        trials: 4,
        secret_len: 1,
        max_relative_spread: 0.5,
    };
    let report = run_timing_harness(&comparator, &config).unwrap();
    assert_eq!(report.samples.len(), Probe::ALL.len());
}

#[test]
fn harness_rejects_zero_trials() {
    let (comparator, _sink) = recording_comparator();
    let config = TimingConfig {
        trials: 0,
        ..TimingConfig::default()
    };
    let err = run_timing_harness(&comparator, &config).unwrap_err();
    assert!(matches!(err, TimingError::InvalidConfig(_)));
}

#[test]
fn position_probes_are_classified() {
    assert!(!Probe::Equal.is_position_mismatch());
    assert!(Probe::FirstByte.is_position_mismatch());
    assert!(Probe::MiddleByte.is_position_mismatch());
    assert!(Probe::LastByte.is_position_mismatch());
    assert!(!Probe::LengthMismatch.is_position_mismatch());
}
