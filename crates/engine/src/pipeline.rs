// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ingestion pipeline: WAL append, bounded queue, batching consumer

use crate::error::EngineError;
use crate::persister::BatchPersister;
use aw_adapters::{AuditStore, MetricsSink};
use aw_core::{metrics, AuditEntry, AuditEvent};
use aw_storage::{DurableLog, PayloadCodec};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Front door of the audit subsystem.
///
/// `log` never blocks on downstream work and never fails: the WAL append is
/// the durability point, and anything that goes wrong after it only costs
/// latency (recovery picks the record up on the next start).
pub struct IngestionPipeline<C: PayloadCodec<Payload = AuditEntry>, M> {
    log: Arc<DurableLog<C>>,
    metrics: M,
    batch_size: u64,
    sender: mpsc::Sender<AuditEvent>,
    receiver: Mutex<Option<mpsc::Receiver<AuditEvent>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<C, M> IngestionPipeline<C, M>
where
    C: PayloadCodec<Payload = AuditEntry>,
    M: MetricsSink,
{
    /// `batch_size` of 0 disables size-triggered flushes.
    ///
    /// A `queue_capacity` of 0 is treated as 1.
    pub fn new(log: Arc<DurableLog<C>>, metrics: M, queue_capacity: usize, batch_size: u64) -> Self {
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        Self {
            log,
            metrics,
            batch_size,
            sender,
            receiver: Mutex::new(Some(receiver)),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn durable_log(&self) -> &Arc<DurableLog<C>> {
        &self.log
    }

    /// Record an audit entry.
    ///
    /// Failures are reported through metrics and logs only.
    pub fn log(&self, entry: AuditEntry) {
        let sequence = match self.log.append(&entry) {
            Ok(sequence) => sequence,
            Err(e) => {
                self.metrics.increment(metrics::WRITE_ERRORS);
                error!(error = %e, action = %entry.action, "failed to append audit entry to WAL");
                return;
            }
        };

        match self.sender.try_send(AuditEvent::Record { entry, sequence }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.metrics.increment(metrics::QUEUE_FULL_ERRORS);
                warn!(sequence, "audit queue full, record deferred to recovery");
            }
            Err(TrySendError::Closed(_)) => {
                self.metrics.increment(metrics::QUEUE_CLOSED);
                warn!(sequence, "audit queue closed, record deferred to recovery");
            }
        }
    }

    /// Spawn the consumer and the flush ticker. Only the first call succeeds.
    pub fn start<S: AuditStore>(
        &self,
        persister: BatchPersister<S>,
        flush_interval: Duration,
    ) -> Result<(), EngineError> {
        let receiver = self
            .receiver
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or(EngineError::AlreadyStarted)?;

        let consumer = Consumer {
            persister,
            metrics: self.metrics.clone(),
            batch_size: self.batch_size,
        };
        let consumer_task = tokio::spawn(consumer.run(receiver));
        let ticker_task = tokio::spawn(run_ticker(self.sender.clone(), flush_interval));
        self.lock_tasks().extend([consumer_task, ticker_task]);

        info!(
            batch_size = self.batch_size,
            flush_interval_ms = flush_interval.as_millis() as u64,
            "ingestion pipeline started"
        );
        Ok(())
    }

    /// Stop the consumer and ticker without draining the queue
    pub fn shutdown(&self) {
        let tasks: Vec<_> = self.lock_tasks().drain(..).collect();
        if tasks.is_empty() {
            return;
        }
        for task in tasks {
            task.abort();
        }
        info!("ingestion pipeline stopped");
    }

    pub fn is_running(&self) -> bool {
        self.lock_tasks().iter().any(|t| !t.is_finished())
    }

    /// Events waiting for the consumer
    pub fn queue_depth(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<C: PayloadCodec<Payload = AuditEntry>, M> Drop for IngestionPipeline<C, M> {
    fn drop(&mut self) {
        for task in self.tasks.get_mut().unwrap_or_else(|e| e.into_inner()).drain(..) {
            task.abort();
        }
    }
}

/// Enqueue a `Tick` every `period`, first one a full period after start
async fn run_ticker(sender: mpsc::Sender<AuditEvent>, period: Duration) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        if sender.send(AuditEvent::Tick).await.is_err() {
            break;
        }
    }
}

/// Single consumer of the queue; owns the persister
pub(crate) struct Consumer<S, M> {
    pub(crate) persister: BatchPersister<S>,
    pub(crate) metrics: M,
    pub(crate) batch_size: u64,
}

impl<S: AuditStore, M: MetricsSink> Consumer<S, M> {
    pub(crate) async fn run(mut self, mut receiver: mpsc::Receiver<AuditEvent>) {
        while let Some(event) = receiver.recv().await {
            self.handle(event).await;
        }
        debug!("audit queue closed, consumer exiting");
    }

    pub(crate) async fn handle(&mut self, event: AuditEvent) {
        match event {
            AuditEvent::Record { entry, sequence } => {
                if sequence <= self.persister.replayed_through() {
                    // Logged while recovery ran and already replayed
                    self.metrics.increment(metrics::REPLAYED_DUPLICATES);
                    debug!(sequence, "skipping record delivered by replay");
                    return;
                }
                self.persister.add(entry, sequence);
                if self.batch_size != 0 && sequence % self.batch_size == 0 {
                    self.flush("size").await;
                }
            }
            AuditEvent::Tick => self.flush("tick").await,
        }
    }

    async fn flush(&mut self, trigger: &'static str) {
        match self.persister.flush().await {
            Ok(0) => {}
            Ok(count) => debug!(
                trigger,
                count,
                checkpoint = self.persister.committed(),
                "audit batch committed"
            ),
            Err(e) => {
                self.metrics.increment(metrics::FLUSH_ERRORS);
                error!(
                    trigger,
                    pending = self.persister.pending_len(),
                    error = %e,
                    "audit flush failed, batch kept for retry"
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
