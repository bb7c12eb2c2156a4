// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Downstream store for committed audit entries and checkpoints

mod file;

pub use file::FileAuditStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeAuditStore, StoreCall};

use async_trait::async_trait;
use aw_core::{Checkpoint, SequencedEntry};
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid node name: {0:?}")]
    InvalidNodeName(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistent home of audit entries and per-node checkpoints.
///
/// Each call is atomic on its own; nothing spans calls.
#[async_trait]
pub trait AuditStore: Clone + Send + Sync + 'static {
    /// Commit a batch of records in one call.
    ///
    /// A retried batch may repeat records already committed; they carry the
    /// same `(node_name, sequence)` as the first delivery.
    async fn insert_all(&self, records: &[SequencedEntry]) -> Result<(), StoreError>;

    /// Checkpoint for a node, if one has been saved
    async fn find_checkpoint(&self, node_name: &str) -> Result<Option<Checkpoint>, StoreError>;

    /// Create or replace a node's checkpoint
    async fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<(), StoreError>;
}
