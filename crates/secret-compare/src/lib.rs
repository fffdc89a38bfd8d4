// crates/secret-compare/src/lib.rs
// ============================================================================
// Module: Secret Compare Library
// Description: Constant-time equality for secret-bearing values.
// Purpose: Provide a total, side-channel resistant comparison primitive.
// Dependencies: base64, hex, rand, serde, subtle, thiserror, toml, zeroize
// ============================================================================

//! ## Overview
//! `secret-compare` answers one question: are two secret values (bearer
//! tokens, HMAC digests, API keys) byte-for-byte identical? The answer is a
//! plain `bool` and the comparison is built so that its running time does not
//! depend on where the inputs first differ, nor on a cheap early return when
//! their lengths differ.
//!
//! The comparator is total. Absent input, length mismatch, content mismatch,
//! and internal decoding failures all collapse to `false`; callers cannot tell
//! them apart. Internal failures are recorded through a [`CompareAuditSink`]
//! using labels only.
//!
//! ## Invariants
//! - Empty or absent input never matches, including `("", "")`.
//! - Every non-empty comparison performs one constant-time pass over a buffer
//!   whose size depends only on the left input (or the configured fixed width).
//! - No record, error, or `Debug` output contains secret bytes.
//!
//! Security posture: inputs are secret and adversary-influenced; see
//! `DESIGN.md` for the documented length limitation.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Failure audit events and sinks.
pub mod audit;
/// Constant-time comparator.
pub mod compare;
/// TOML configuration for the comparator and timing harness.
pub mod config;
/// Conversion of caller values into comparable bytes.
pub mod input;
/// Owned secret values.
pub mod secret;
/// Statistical timing harness.
pub mod timing;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::CompareAuditEvent;
pub use audit::CompareAuditSink;
pub use audit::FileAuditSink;
pub use audit::InputSide;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use compare::SecretComparator;
pub use compare::safe_compare;
pub use compare::safe_compare_bytes;
pub use compare::safe_compare_str;
pub use config::AuditConfig;
pub use config::AuditSinkKind;
pub use config::CompareConfig;
pub use config::ComparatorConfig;
pub use config::ConfigError;
pub use config::TimingConfig;
pub use input::Encoded;
pub use input::InputError;
pub use input::SecretEncoding;
pub use input::SecretInput;
pub use secret::SecretValue;
pub use timing::Probe;
pub use timing::TimingError;
pub use timing::TimingReport;
pub use timing::TimingSample;
pub use timing::run_timing_harness;
