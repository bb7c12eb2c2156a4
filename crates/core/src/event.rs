// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Units of work flowing through the ingestion queue

use crate::entry::AuditEntry;

/// What the pipeline consumer receives.
///
/// A single ordered queue carries both the records to persist and the
/// time-based flush triggers, so no second synchronization primitive is
/// needed. Every consumer must match both variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvent {
    /// A record already durable in the WAL, tagged with its sequence
    Record { entry: AuditEntry, sequence: u64 },

    /// Force a flush of whatever is pending
    Tick,
}

impl AuditEvent {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            AuditEvent::Record { .. } => "audit:record",
            AuditEvent::Tick => "audit:tick",
        }
    }

    /// Sequence number carried by a record, if any
    pub fn sequence(&self) -> Option<u64> {
        match self {
            AuditEvent::Record { sequence, .. } => Some(*sequence),
            AuditEvent::Tick => None,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
