// crates/secret-compare/src/audit.rs
// ============================================================================
// Module: Comparison Audit Logging
// Description: Structured audit events for internal comparison failures.
// Purpose: Emit redacted audit logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The comparator never reports failures to its caller. Instead, internal
//! failures (for example a hex secret that does not decode) are recorded as
//! JSON-line audit events through a [`CompareAuditSink`]. Events carry the
//! failing side and a static reason label, nothing derived from the input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Which argument of a comparison an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSide {
    /// First argument.
    Left,
    /// Second argument.
    Right,
}

/// Comparison failure audit event payload.
///
/// # Invariants
/// - Fields are labels and timestamps only; no secret-derived data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompareAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Side of the comparison that failed.
    pub side: InputSide,
    /// Stable failure reason label.
    pub reason: &'static str,
}

impl CompareAuditEvent {
    /// Creates a failure event with a consistent timestamp.
    #[must_use]
    pub fn failure(side: InputSide, reason: &'static str) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "secret_compare_failure",
            timestamp_ms,
            side,
            reason,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for comparison failures.
///
/// Implementations must not fail the comparison; write errors are dropped.
pub trait CompareAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &CompareAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl CompareAuditSink for StderrAuditSink {
    fn record(&self, event: &CompareAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl CompareAuditSink for FileAuditSink {
    fn record(&self, event: &CompareAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl CompareAuditSink for NoopAuditSink {
    fn record(&self, _event: &CompareAuditEvent) {}
}
