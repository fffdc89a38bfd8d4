// crates/secret-compare/src/tests/support.rs
// ============================================================================
// Module: Unit Test Support
// Description: Shared fixtures for library unit tests.
// Purpose: Capture audit events in memory.
// Dependencies: secret-compare audit module
// ============================================================================

//! ## Overview
//! In-memory audit sink and comparator constructors used across unit tests.

use std::sync::Arc;
use std::sync::Mutex;

use crate::audit::CompareAuditEvent;
use crate::audit::CompareAuditSink;
use crate::compare::SecretComparator;

/// Audit sink that keeps every event in memory.
#[derive(Default)]
pub(super) struct RecordingSink {
    /// Recorded events.
    events: Mutex<Vec<CompareAuditEvent>>,
}

impl RecordingSink {
    /// Returns a snapshot of the recorded events.
    pub(super) fn events(&self) -> Vec<CompareAuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl CompareAuditSink for RecordingSink {
    fn record(&self, event: &CompareAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Builds a comparator wired to a fresh recording sink.
pub(super) fn recording_comparator() -> (SecretComparator, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    (SecretComparator::new(sink.clone()), sink)
}
