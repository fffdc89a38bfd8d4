// crates/secret-compare/src/timing.rs
// ============================================================================
// Module: Timing Harness
// Description: Statistical latency measurement for the comparator.
// Purpose: Check that mismatch position does not shift comparison latency.
// Dependencies: rand, serde, thiserror
// ============================================================================

//! ## Overview
//! The harness builds a random reference secret and a set of candidates
//! ([`Probe`]), then times the comparator against each candidate. Trials are
//! interleaved across probes so scheduler noise lands on all of them alike.
//!
//! The result is statistical. [`TimingReport::within_tolerance`] compares the
//! spread between mismatch-position means against the configured tolerance;
//! callers decide what to do with it. Nothing here asserts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::hint::black_box;
use std::time::Instant;

use rand::RngCore;
use serde::Serialize;
use thiserror::Error;

use crate::compare::SecretComparator;
use crate::config::TimingConfig;
use crate::secret::SecretValue;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Candidate shape compared against the reference secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Probe {
    /// Identical to the reference.
    Equal,
    /// Differs in the first byte.
    FirstByte,
    /// Differs in the middle byte.
    MiddleByte,
    /// Differs in the last byte.
    LastByte,
    /// Reference with one extra trailing byte.
    LengthMismatch,
}

impl Probe {
    /// Every probe, in report order.
    pub const ALL: [Self; 5] =
        [Self::Equal, Self::FirstByte, Self::MiddleByte, Self::LastByte, Self::LengthMismatch];

    /// Returns true for probes that differ at a byte position.
    #[must_use]
    pub const fn is_position_mismatch(self) -> bool {
        matches!(self, Self::FirstByte | Self::MiddleByte | Self::LastByte)
    }

    /// Builds the candidate for this probe from `reference`.
    fn candidate(self, reference: &[u8]) -> SecretValue {
        let mut bytes = reference.to_vec();
        let last = bytes.len().saturating_sub(1);
        let flip = match self {
            Self::Equal => None,
            Self::FirstByte => Some(0),
            Self::MiddleByte => Some(bytes.len() / 2),
            Self::LastByte => Some(last),
            Self::LengthMismatch => {
                bytes.push(0);
                None
            }
        };
        if let Some(byte) = flip.and_then(|index| bytes.get_mut(index)) {
            *byte ^= 0x01;
        }
        SecretValue::new(bytes)
    }
}

/// Latency summary for one probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingSample {
    /// Probe measured.
    pub probe: Probe,
    /// Mean latency in nanoseconds.
    pub mean_ns: f64,
    /// Fastest observed call in nanoseconds.
    pub min_ns: u64,
}

/// Timing harness output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingReport {
    /// Timed calls per probe.
    pub trials: u32,
    /// Reference secret length in bytes.
    pub secret_len: usize,
    /// Per-probe summaries in [`Probe::ALL`] order.
    pub samples: Vec<TimingSample>,
    /// `(max - min) / min` over mismatch-position means.
    pub relative_spread: f64,
    /// Configured tolerance for `relative_spread`.
    pub max_relative_spread: f64,
    /// True when `relative_spread <= max_relative_spread`.
    pub within_tolerance: bool,
}

/// Timing harness errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimingError {
    /// Harness settings are out of range.
    #[error("invalid timing config: {0}")]
    InvalidConfig(String),
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Times `comparator` against every [`Probe`].
///
/// # Errors
///
/// Returns [`TimingError::InvalidConfig`] when `config` fails validation.
pub fn run_timing_harness(
    comparator: &SecretComparator,
    config: &TimingConfig,
) -> Result<TimingReport, TimingError> {
    config.validate().map_err(|err| TimingError::InvalidConfig(err.to_string()))?;

    let mut bytes = vec![0u8; config.secret_len];
    rand::thread_rng().fill_bytes(&mut bytes);
    let reference = SecretValue::new(bytes);
    let candidates: Vec<SecretValue> =
        Probe::ALL.iter().map(|probe| probe.candidate(reference.as_bytes())).collect();

    let mut totals = [0u128; Probe::ALL.len()];
    let mut minimums = [u64::MAX; Probe::ALL.len()];
    for _ in 0 .. config.trials {
        for ((candidate, total), minimum) in
            candidates.iter().zip(totals.iter_mut()).zip(minimums.iter_mut())
        {
            let start = Instant::now();
            black_box(comparator.compare(black_box(&reference), black_box(candidate)));
            let elapsed = start.elapsed().as_nanos();
            *total += elapsed;
            *minimum = (*minimum).min(u64::try_from(elapsed).unwrap_or(u64::MAX));
        }
    }

    let samples: Vec<TimingSample> = Probe::ALL
        .iter()
        .zip(totals.iter().zip(minimums.iter()))
        .map(|(probe, (total, minimum))| TimingSample {
            probe: *probe,
            mean_ns: mean(*total, config.trials),
            min_ns: *minimum,
        })
        .collect();
    let relative_spread = relative_spread(&samples);
    Ok(TimingReport {
        trials: config.trials,
        secret_len: config.secret_len,
        samples,
        relative_spread,
        max_relative_spread: config.max_relative_spread,
        within_tolerance: relative_spread <= config.max_relative_spread,
    })
}

/// Mean of `trials` observations summing to `total`.
#[allow(clippy::cast_precision_loss, reason = "Nanosecond means tolerate f64 rounding.")]
fn mean(total: u128, trials: u32) -> f64 {
    total as f64 / f64::from(trials)
}

/// Relative spread between the slowest and fastest mismatch-position means.
pub(crate) fn relative_spread(samples: &[TimingSample]) -> f64 {
    let means = samples
        .iter()
        .filter(|sample| sample.probe.is_position_mismatch())
        .map(|sample| sample.mean_ns);
    let (min, max) = means.fold((f64::INFINITY, 0.0_f64), |(min, max), value| {
        (min.min(value), max.max(value))
    });
    if !min.is_finite() || min <= 0.0 {
        return 0.0;
    }
    (max - min) / min
}
