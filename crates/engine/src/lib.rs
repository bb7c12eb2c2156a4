// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! aw-engine: batching, ingestion, recovery, and retention
//!
//! Startup order is fixed: open the log, build the pipeline (callers may
//! `log` immediately), run recovery to completion (which starts the
//! pipeline), then start the retention sweeper.

mod error;
mod persister;
mod pipeline;
mod recovery;
mod retention;

#[cfg(test)]
mod test_helpers;

pub use error::EngineError;
pub use persister::BatchPersister;
pub use pipeline::IngestionPipeline;
pub use recovery::{RecoveryProcessor, RecoveryReport};
pub use retention::RetentionSweeper;

use aw_core::AuditEntry;
use aw_storage::{DurableLog, JsonCodec};

/// The WAL as used by the pipeline: JSON-encoded audit entries
pub type AuditLog = DurableLog<JsonCodec<AuditEntry>>;
