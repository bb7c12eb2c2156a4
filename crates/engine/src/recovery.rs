// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup replay of records the checkpoint does not yet cover

use crate::error::EngineError;
use crate::persister::BatchPersister;
use crate::pipeline::IngestionPipeline;
use aw_adapters::{AuditStore, MetricsSink};
use aw_core::AuditEntry;
use aw_storage::PayloadCodec;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Outcome of one recovery run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Checkpoint found at startup
    pub checkpoint: u64,
    /// Records replayed from the WAL
    pub replayed: u64,
    /// Flush calls made, including the final one
    pub flushes: u64,
    /// Checkpoint after the final flush
    pub committed: u64,
}

/// Replays the WAL backlog, then starts the pipeline.
///
/// Runs to completion before live events are consumed, so backlog and live
/// records never interleave at the persister.
pub struct RecoveryProcessor<C: PayloadCodec<Payload = AuditEntry>, M> {
    pipeline: Arc<IngestionPipeline<C, M>>,
    batch_size: u64,
    flush_interval: Duration,
}

impl<C, M> RecoveryProcessor<C, M>
where
    C: PayloadCodec<Payload = AuditEntry>,
    M: MetricsSink,
{
    pub fn new(pipeline: Arc<IngestionPipeline<C, M>>, batch_size: u64, flush_interval: Duration) -> Self {
        Self {
            pipeline,
            batch_size,
            flush_interval,
        }
    }

    /// Any replay or commit failure aborts recovery and leaves the pipeline
    /// stopped. So does a checkpoint past the WAL head: the log no longer
    /// holds what the store says was committed.
    pub async fn run<S: AuditStore>(
        &self,
        mut persister: BatchPersister<S>,
    ) -> Result<RecoveryReport, EngineError> {
        let checkpoint = persister.load_checkpoint().await?;
        let log = self.pipeline.durable_log();
        let head = log.sequence();
        if checkpoint > head {
            error!(
                node = persister.node_name(),
                checkpoint,
                head,
                "checkpoint is ahead of the WAL"
            );
            return Err(EngineError::CheckpointAhead { checkpoint, head });
        }
        info!(
            node = persister.node_name(),
            checkpoint,
            head,
            "replaying WAL backlog"
        );

        let replay = log.replay_after(checkpoint)?;
        persister.mark_replayed(replay.horizon());
        let mut replayed = 0;
        let mut flushes = 0;
        let mut since_flush = 0;
        for record in replay {
            let (entry, sequence) = record?;
            persister.add(entry, sequence);
            replayed += 1;
            since_flush += 1;
            if self.batch_size != 0 && since_flush == self.batch_size {
                persister.flush().await?;
                flushes += 1;
                since_flush = 0;
            }
        }
        persister.flush().await?;
        flushes += 1;

        let report = RecoveryReport {
            checkpoint,
            replayed,
            flushes,
            committed: persister.committed(),
        };
        info!(
            replayed,
            flushes,
            committed = report.committed,
            "WAL backlog recovered"
        );

        self.pipeline.start(persister, self.flush_interval)?;
        Ok(report)
    }
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
