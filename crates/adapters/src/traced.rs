// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrapper for consistent observability

use crate::store::{AuditStore, StoreError};
use async_trait::async_trait;
use aw_core::{Checkpoint, SequencedEntry};
use tracing::Instrument;

/// Wrapper that adds tracing to any AuditStore
#[derive(Clone)]
pub struct TracedAuditStore<S> {
    inner: S,
}

impl<S> TracedAuditStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: AuditStore> AuditStore for TracedAuditStore<S> {
    async fn insert_all(&self, records: &[SequencedEntry]) -> Result<(), StoreError> {
        let span = tracing::info_span!(
            "store.insert_all",
            count = records.len(),
            last_sequence = records.last().map(|r| r.sequence)
        );
        async {
            let start = std::time::Instant::now();
            let result = self.inner.insert_all(records).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "batch committed"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "batch commit failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn find_checkpoint(&self, node_name: &str) -> Result<Option<Checkpoint>, StoreError> {
        let span = tracing::debug_span!("store.find_checkpoint", node_name);
        async {
            let result = self.inner.find_checkpoint(node_name).await;
            match &result {
                Ok(Some(c)) => tracing::debug!(sequence = c.sequence, "checkpoint found"),
                Ok(None) => tracing::debug!("no checkpoint"),
                Err(e) => tracing::error!(error = %e, "checkpoint read failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<(), StoreError> {
        let span = tracing::debug_span!(
            "store.save_checkpoint",
            node_name = %checkpoint.node_name,
            sequence = checkpoint.sequence
        );
        async {
            let result = self.inner.save_checkpoint(checkpoint).await;
            match &result {
                Ok(()) => tracing::debug!("checkpoint saved"),
                Err(e) => tracing::error!(error = %e, "checkpoint write failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
