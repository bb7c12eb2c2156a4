// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batches records and commits them with their checkpoint

use crate::error::EngineError;
use aw_adapters::AuditStore;
use aw_core::{AuditEntry, Checkpoint, SequencedEntry};

/// Accumulates entries and commits them downstream in one call.
///
/// Commit order on flush is fixed: entries first, then the checkpoint. The
/// buffer is cleared only once both succeed, so a failed flush is retried
/// with the same batch (at-least-once delivery). Each entry keeps its WAL
/// sequence, so a retried batch reaches the store under the same keys.
pub struct BatchPersister<S> {
    store: S,
    node_name: String,
    pending: Vec<SequencedEntry>,
    /// Highest sequence added since the last successful flush
    high_water: u64,
    /// Checkpoint as of the last successful flush or load
    committed: u64,
    /// WAL head covered by startup replay; 0 when no replay ran
    replayed_through: u64,
}

impl<S: AuditStore> BatchPersister<S> {
    pub fn new(store: S, node_name: impl Into<String>) -> Self {
        Self {
            store,
            node_name: node_name.into(),
            pending: Vec::new(),
            high_water: 0,
            committed: 0,
            replayed_through: 0,
        }
    }

    pub fn add(&mut self, entry: AuditEntry, sequence: u64) {
        self.pending
            .push(SequencedEntry::new(self.node_name.as_str(), sequence, entry));
        self.high_water = self.high_water.max(sequence);
    }

    /// Commit the pending batch. Returns how many entries were committed.
    pub async fn flush(&mut self) -> Result<usize, EngineError> {
        if self.pending.is_empty() {
            return Ok(0);
        }

        self.store.insert_all(&self.pending).await?;

        let mut checkpoint = self
            .store
            .find_checkpoint(&self.node_name)
            .await?
            .unwrap_or_else(|| Checkpoint::new(&self.node_name));
        checkpoint.advance_to(self.high_water);
        self.store.save_checkpoint(&checkpoint).await?;

        let count = self.pending.len();
        self.pending.clear();
        self.committed = checkpoint.sequence;
        Ok(count)
    }

    /// Read this node's checkpoint from the store; 0 if there is none
    pub async fn load_checkpoint(&mut self) -> Result<u64, EngineError> {
        let sequence = self
            .store
            .find_checkpoint(&self.node_name)
            .await?
            .map_or(0, |c| c.sequence);
        self.committed = self.committed.max(sequence);
        Ok(sequence)
    }

    pub fn committed(&self) -> u64 {
        self.committed
    }

    /// Record the head a startup replay ran up to
    pub fn mark_replayed(&mut self, head: u64) {
        self.replayed_through = self.replayed_through.max(head);
    }

    /// Sequences at or below this were delivered by replay
    pub fn replayed_through(&self) -> u64 {
        self.replayed_through
    }

    pub fn high_water(&self) -> u64 {
        self.high_water
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }
}

#[cfg(test)]
#[path = "persister_tests.rs"]
mod tests;
