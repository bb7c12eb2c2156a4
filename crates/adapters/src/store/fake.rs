// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake audit store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{AuditStore, StoreError};
use async_trait::async_trait;
use aw_core::{Checkpoint, SequencedEntry};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    InsertAll { count: usize },
    FindCheckpoint { node_name: String },
    SaveCheckpoint { node_name: String, sequence: u64 },
}

#[derive(Default)]
struct FakeState {
    records: Vec<SequencedEntry>,
    checkpoints: HashMap<String, Checkpoint>,
    calls: Vec<StoreCall>,
    failing_inserts: usize,
    failing_finds: usize,
    failing_saves: usize,
}

/// In-memory store with scriptable failures
#[derive(Clone, Default)]
pub struct FakeAuditStore {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state().calls.clone()
    }

    /// Only the insert calls, as batch sizes
    pub fn insert_sizes(&self) -> Vec<usize> {
        self.state()
            .calls
            .iter()
            .filter_map(|c| match c {
                StoreCall::InsertAll { count } => Some(*count),
                _ => None,
            })
            .collect()
    }

    /// Every committed record, in commit order, repeats included
    pub fn records(&self) -> Vec<SequencedEntry> {
        self.state().records.clone()
    }

    /// Sequences of every committed record, in commit order
    pub fn sequences(&self) -> Vec<u64> {
        self.state().records.iter().map(|r| r.sequence).collect()
    }

    pub fn checkpoint(&self, node_name: &str) -> Option<u64> {
        self.state().checkpoints.get(node_name).map(|c| c.sequence)
    }

    /// Seed a checkpoint without recording a call
    pub fn set_checkpoint(&self, node_name: &str, sequence: u64) {
        self.state().checkpoints.insert(
            node_name.to_string(),
            Checkpoint {
                node_name: node_name.to_string(),
                sequence,
            },
        );
    }

    /// Make the next `n` inserts fail
    pub fn fail_inserts(&self, n: usize) {
        self.state().failing_inserts = n;
    }

    /// Make the next `n` checkpoint reads fail
    pub fn fail_finds(&self, n: usize) {
        self.state().failing_finds = n;
    }

    /// Make the next `n` checkpoint writes fail
    pub fn fail_saves(&self, n: usize) {
        self.state().failing_saves = n;
    }
}

fn take_failure(counter: &mut usize, what: &str) -> Result<(), StoreError> {
    if *counter == 0 {
        return Ok(());
    }
    *counter -= 1;
    Err(StoreError::Unavailable(format!("injected {what} failure")))
}

#[async_trait]
impl AuditStore for FakeAuditStore {
    async fn insert_all(&self, records: &[SequencedEntry]) -> Result<(), StoreError> {
        let mut state = self.state();
        state.calls.push(StoreCall::InsertAll {
            count: records.len(),
        });
        take_failure(&mut state.failing_inserts, "insert")?;
        state.records.extend_from_slice(records);
        Ok(())
    }

    async fn find_checkpoint(&self, node_name: &str) -> Result<Option<Checkpoint>, StoreError> {
        let mut state = self.state();
        state.calls.push(StoreCall::FindCheckpoint {
            node_name: node_name.to_string(),
        });
        take_failure(&mut state.failing_finds, "checkpoint read")?;
        Ok(state.checkpoints.get(node_name).cloned())
    }

    async fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<(), StoreError> {
        let mut state = self.state();
        state.calls.push(StoreCall::SaveCheckpoint {
            node_name: checkpoint.node_name.clone(),
            sequence: checkpoint.sequence,
        });
        take_failure(&mut state.failing_saves, "checkpoint write")?;
        state
            .checkpoints
            .insert(checkpoint.node_name.clone(), checkpoint.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
