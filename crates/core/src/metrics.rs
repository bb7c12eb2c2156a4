// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Names of the error counters reported by the pipeline

/// A WAL append failed inside `log`; the record was not queued
pub const WRITE_ERRORS: &str = "audit.log.write_errors";

/// The ingestion queue was full; the record stays in the WAL only
pub const QUEUE_FULL_ERRORS: &str = "audit.log.queue_full";

/// The ingestion queue was closed by shutdown; the record stays in the WAL only
pub const QUEUE_CLOSED: &str = "audit.log.queue_closed";

/// A queued record was already delivered by startup replay and was dropped
pub const REPLAYED_DUPLICATES: &str = "audit.log.replayed_duplicates";

/// A downstream commit failed; the batch is retried on the next trigger
pub const FLUSH_ERRORS: &str = "audit.flush.errors";

/// A retention sweep failed; retried on the next cycle
pub const CLEANUP_ERRORS: &str = "audit.retention.errors";

/// Every counter the pipeline may increment
pub const ALL: [&str; 6] = [
    WRITE_ERRORS,
    QUEUE_FULL_ERRORS,
    QUEUE_CLOSED,
    REPLAYED_DUPLICATES,
    FLUSH_ERRORS,
    CLEANUP_ERRORS,
];
