// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine unit tests

use crate::AuditLog;
use aw_core::AuditEntry;
use aw_storage::{JsonCodec, LogOptions};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub fn entry(n: u64) -> AuditEntry {
    AuditEntry::new("proj", "SECRET", format!("secret-{n}"), "READ_SECRET", "alice")
}

pub fn open_log(dir: &Path, max_records: u64) -> Arc<AuditLog> {
    Arc::new(AuditLog::open(dir, LogOptions::new(max_records), JsonCodec::new()).unwrap())
}

pub fn fill_log(log: &AuditLog, count: u64) {
    for n in 1..=count {
        log.append(&entry(n)).unwrap();
    }
}

/// Poll until `cond` holds, failing after a couple of seconds
pub async fn wait_for(mut cond: impl FnMut() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}
