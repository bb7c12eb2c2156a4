// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn record_exposes_sequence() {
    let event = AuditEvent::Record {
        entry: AuditEntry::new("p", "SECRET", "s", "READ_SECRET", "u"),
        sequence: 42,
    };
    assert_eq!(event.sequence(), Some(42));
    assert_eq!(event.name(), "audit:record");
}

#[test]
fn tick_has_no_sequence() {
    assert_eq!(AuditEvent::Tick.sequence(), None);
    assert_eq!(AuditEvent::Tick.name(), "audit:tick");
}
