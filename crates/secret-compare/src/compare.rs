// crates/secret-compare/src/compare.rs
// ============================================================================
// Module: Constant-Time Comparator
// Description: Total, constant-time equality for secret values.
// Purpose: Gate authorization decisions without timing side-channels.
// Dependencies: subtle, zeroize
// ============================================================================

//! ## Overview
//! [`safe_compare`] and [`SecretComparator::compare`] return `true` only when
//! both inputs are present and byte-for-byte identical. Every other outcome,
//! including decoding failures, is `false`.
//!
//! Once both inputs are present, the comparison always runs one
//! [`subtle::ConstantTimeEq`] pass over a buffer sized by the left input. The
//! right input is copied into a zero-filled scratch buffer of that size, and
//! the byte result is combined with a constant-time length check. There is no
//! early return on length mismatch.
//!
//! ## Known limitation
//! Scratch size follows the left input, so gross length differences between
//! calls may still show up in total time. Callers that need length hiding
//! configure a fixed width ([`SecretComparator::with_fixed_width`]); both
//! inputs are then padded to that width and the cost depends on the width
//! alone.
//!
//! Security posture: inputs are secret; see `DESIGN.md`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use subtle::ConstantTimeEq;
use subtle::ConstantTimeGreater;
use zeroize::Zeroizing;

use crate::audit::CompareAuditEvent;
use crate::audit::CompareAuditSink;
use crate::audit::InputSide;
use crate::audit::StderrAuditSink;
use crate::config::CompareConfig;
use crate::config::ConfigError;
use crate::input::InputError;
use crate::input::SecretInput;

// ============================================================================
// SECTION: Free Functions
// ============================================================================

/// Compares two secrets in constant time.
///
/// Returns `false` for absent or empty input (so `safe_compare("", "")` is
/// `false`), for length or content mismatch, and for inputs that fail to
/// decode. Decoding failures are recorded as JSON lines on stderr.
#[must_use]
pub fn safe_compare(a: impl SecretInput, b: impl SecretInput) -> bool {
    compare_with(&StderrAuditSink, None, &a, &b)
}

/// Compares two byte slices in constant time.
#[must_use]
pub fn safe_compare_bytes(a: &[u8], b: &[u8]) -> bool {
    safe_compare(a, b)
}

/// Compares two strings in constant time.
#[must_use]
pub fn safe_compare_str(a: &str, b: &str) -> bool {
    safe_compare(a, b)
}

// ============================================================================
// SECTION: Comparator
// ============================================================================

/// Configurable constant-time comparator.
///
/// # Invariants
/// - `fixed_width`, when set, is non-zero.
/// - Cloning shares the audit sink.
#[derive(Clone)]
pub struct SecretComparator {
    /// Sink receiving failure events.
    sink: Arc<dyn CompareAuditSink>,
    /// Width both inputs are padded to, when length hiding is enabled.
    fixed_width: Option<usize>,
}

impl SecretComparator {
    /// Builds a comparator that reports failures to `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn CompareAuditSink>) -> Self {
        Self {
            sink,
            fixed_width: None,
        }
    }

    /// Returns a copy that pads both inputs to `width` bytes. A width of zero
    /// disables padding.
    #[must_use]
    pub fn with_fixed_width(mut self, width: usize) -> Self {
        self.fixed_width = (width > 0).then_some(width);
        self
    }

    /// Builds a comparator from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configured audit sink cannot be opened.
    pub fn from_config(config: &CompareConfig) -> Result<Self, ConfigError> {
        let sink = config.audit.build_sink()?;
        let comparator = Self::new(sink);
        Ok(match config.comparator.fixed_width {
            Some(width) => comparator.with_fixed_width(width),
            None => comparator,
        })
    }

    /// Returns the configured padding width.
    #[must_use]
    pub const fn fixed_width(&self) -> Option<usize> {
        self.fixed_width
    }

    /// Compares two secrets in constant time. See [`safe_compare`].
    #[must_use]
    pub fn compare(&self, a: impl SecretInput, b: impl SecretInput) -> bool {
        compare_with(self.sink.as_ref(), self.fixed_width, &a, &b)
    }
}

impl Default for SecretComparator {
    fn default() -> Self {
        Self::new(Arc::new(StderrAuditSink))
    }
}

impl fmt::Debug for SecretComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretComparator").field("fixed_width", &self.fixed_width).finish()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts both inputs, then compares or audits.
fn compare_with<A, B>(
    sink: &dyn CompareAuditSink,
    fixed_width: Option<usize>,
    a: &A,
    b: &B,
) -> bool
where
    A: SecretInput + ?Sized,
    B: SecretInput + ?Sized,
{
    // Both sides are converted before the outcome is decided.
    let left = a.secret_bytes();
    let right = b.secret_bytes();
    match (left, right) {
        (Ok(left), Ok(right)) => match fixed_width {
            Some(width) => fixed_width_eq(&left, &right, width),
            None => normalized_eq(&left, &right),
        },
        (left, right) => {
            audit_failure(sink, InputSide::Left, left.err());
            audit_failure(sink, InputSide::Right, right.err());
            false
        }
    }
}

/// Records an internal failure; absence is not audited.
fn audit_failure(sink: &dyn CompareAuditSink, side: InputSide, error: Option<InputError>) {
    if let Some(error) = error
        && error.is_failure()
    {
        sink.record(&CompareAuditEvent::failure(side, error.reason()));
    }
}

/// Compares `left` against `right` copied into a buffer of `left.len()`.
fn normalized_eq(left: &[u8], right: &[u8]) -> bool {
    let lengths_match = left.len().ct_eq(&right.len());
    let scratch = padded(right, left.len());
    let bytes_match = left.ct_eq(scratch.as_slice());
    bool::from(bytes_match & lengths_match)
}

/// Compares both inputs padded to exactly `width` bytes.
fn fixed_width_eq(left: &[u8], right: &[u8], width: usize) -> bool {
    let left_buf = padded(left, width);
    let right_buf = padded(right, width);
    let lengths_match = left.len().ct_eq(&right.len());
    // Inputs longer than the width were truncated and must not match.
    let fits = !len_u64(left.len()).ct_gt(&len_u64(width));
    let bytes_match = left_buf.as_slice().ct_eq(right_buf.as_slice());
    bool::from(bytes_match & lengths_match & fits)
}

/// Widens a length for `subtle` ordering checks.
fn len_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

/// Copies up to `width` bytes of `bytes` into a zero-filled buffer.
fn padded(bytes: &[u8], width: usize) -> Zeroizing<Vec<u8>> {
    let mut buf = Zeroizing::new(vec![0u8; width]);
    let shared = bytes.len().min(width);
    buf[.. shared].copy_from_slice(&bytes[.. shared]);
    buf
}
