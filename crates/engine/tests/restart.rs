// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end: log, stop without draining, restart, recover, retain

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use aw_adapters::{AuditStore, CounterMetrics, FileAuditStore, TracedAuditStore};
use aw_core::{AuditEntry, SequentialIdGen};
use aw_engine::{AuditLog, BatchPersister, IngestionPipeline, RecoveryProcessor, RetentionSweeper};
use aw_storage::{list_segments, JsonCodec, LogOptions};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const NODE: &str = "node-a";

struct Node {
    log: Arc<AuditLog>,
    pipeline: Arc<IngestionPipeline<JsonCodec<AuditEntry>, CounterMetrics>>,
    store: TracedAuditStore<FileAuditStore<SequentialIdGen>>,
}

impl Node {
    fn open(wal: &Path, store_root: &Path, batch_size: u64) -> Self {
        let log = Arc::new(AuditLog::open(wal, LogOptions::new(10), JsonCodec::new()).unwrap());
        let pipeline = Arc::new(IngestionPipeline::new(
            log.clone(),
            CounterMetrics::new(),
            1024,
            batch_size,
        ));
        let store = TracedAuditStore::new(FileAuditStore::with_ids(
            store_root,
            SequentialIdGen::new("rec"),
        ));
        Self {
            log,
            pipeline,
            store,
        }
    }

    async fn recover(&self, batch_size: u64) -> aw_engine::RecoveryReport {
        RecoveryProcessor::new(self.pipeline.clone(), batch_size, Duration::from_secs(3600))
            .run(BatchPersister::new(self.store.clone(), NODE))
            .await
            .unwrap()
    }
}

fn read(n: u64) -> AuditEntry {
    AuditEntry::new("proj", "SECRET", format!("secret-{n}"), "READ_SECRET", "alice")
}

#[tokio::test]
async fn records_survive_a_stop_without_draining() {
    let wal = tempfile::tempdir().unwrap();
    let store_root = tempfile::tempdir().unwrap();

    // First run: size trigger never fires, ticker is an hour away
    {
        let node = Node::open(wal.path(), store_root.path(), 1000);
        node.recover(1000).await;
        for n in 1..=25 {
            node.pipeline.log(read(n));
        }
        node.pipeline.shutdown();
        assert_eq!(node.log.sequence(), 25);
        assert!(node.store.inner().records().await.unwrap().is_empty());
    }

    // Second run: recovery commits the whole backlog
    let node = Node::open(wal.path(), store_root.path(), 10);
    let report = node.recover(10).await;
    assert_eq!(report.checkpoint, 0);
    assert_eq!(report.replayed, 25);
    assert_eq!(report.committed, 25);

    let records = node.store.inner().records().await.unwrap();
    let names: Vec<String> = records
        .iter()
        .map(|r| r.entry.resource_name.clone())
        .collect();
    let expected: Vec<String> = (1..=25).map(|n| format!("secret-{n}")).collect();
    assert_eq!(names, expected);
    let sequences: Vec<u64> = records.iter().map(|r| r.sequence).collect();
    assert_eq!(sequences, (1..=25).collect::<Vec<u64>>());
    assert!(records.iter().all(|r| r.node_name == NODE));
    assert!(records.iter().all(|r| r.entry.id.is_some()));

    // Checkpoint covers the two rotated segments
    let sweeper = RetentionSweeper::new(
        node.log.clone(),
        node.store.clone(),
        NODE,
        CounterMetrics::new(),
    );
    assert_eq!(sweeper.sweep().await, 2);
    let bases: Vec<u64> = list_segments(wal.path())
        .unwrap()
        .iter()
        .map(|s| s.base)
        .collect();
    assert_eq!(bases, vec![20]);

    // New records continue the sequence
    node.pipeline.log(read(26));
    assert_eq!(node.log.sequence(), 26);
    node.pipeline.shutdown();
}

#[tokio::test]
async fn restart_after_full_commit_replays_nothing() {
    let wal = tempfile::tempdir().unwrap();
    let store_root = tempfile::tempdir().unwrap();

    {
        let node = Node::open(wal.path(), store_root.path(), 5);
        node.recover(5).await;
        for n in 1..=10 {
            node.pipeline.log(read(n));
        }
        for _ in 0..200 {
            let checkpoint = node.store.find_checkpoint(NODE).await.unwrap();
            if checkpoint.map(|c| c.sequence) == Some(10) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        node.pipeline.shutdown();
    }

    let node = Node::open(wal.path(), store_root.path(), 5);
    let report = node.recover(5).await;
    assert_eq!(report.checkpoint, 10);
    assert_eq!(report.replayed, 0);
    assert_eq!(node.store.inner().records().await.unwrap().len(), 10);
    node.pipeline.shutdown();
}
