// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic removal of fully committed WAL segments

use crate::error::EngineError;
use aw_adapters::{AuditStore, MetricsSink};
use aw_core::{metrics, Checkpoint};
use aw_storage::{DurableLog, PayloadCodec};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Deletes WAL segments once the checkpoint covers them.
///
/// A failed sweep is never fatal: the log keeps growing until the next
/// successful pass.
pub struct RetentionSweeper<C: PayloadCodec, S, M> {
    log: Arc<DurableLog<C>>,
    store: S,
    node_name: String,
    metrics: M,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<C, S, M> RetentionSweeper<C, S, M>
where
    C: PayloadCodec,
    S: AuditStore,
    M: MetricsSink,
{
    pub fn new(log: Arc<DurableLog<C>>, store: S, node_name: impl Into<String>, metrics: M) -> Self {
        Self {
            log,
            store,
            node_name: node_name.into(),
            metrics,
            task: Mutex::new(None),
        }
    }

    /// One pass; returns the number of segments removed
    pub async fn try_sweep(&self) -> Result<usize, EngineError> {
        let checkpoint = self
            .store
            .find_checkpoint(&self.node_name)
            .await?
            .unwrap_or_else(|| Checkpoint::new(&self.node_name));
        Ok(self.log.retain(checkpoint.sequence)?)
    }

    /// One pass with failures counted and logged instead of returned
    pub async fn sweep(&self) -> usize {
        match self.try_sweep().await {
            Ok(removed) => {
                if removed > 0 {
                    info!(removed, "removed committed WAL segments");
                } else {
                    debug!("no WAL segments to remove");
                }
                removed
            }
            Err(e) => {
                self.metrics.increment(metrics::CLEANUP_ERRORS);
                error!(error = %e, "WAL retention sweep failed");
                0
            }
        }
    }

    /// Sweep every `interval`, measured from the end of the previous pass
    pub fn start(self: &Arc<Self>, interval: Duration) {
        let sweeper = Arc::clone(self);
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                sweeper.sweep().await;
            }
        });
        if let Some(previous) = self.lock_task().replace(handle) {
            previous.abort();
        }
    }

    pub fn shutdown(&self) {
        if let Some(task) = self.lock_task().take() {
            task.abort();
        }
    }

    fn lock_task(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "retention_tests.rs"]
mod tests;
