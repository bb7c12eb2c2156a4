// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, recovery.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use aw_adapters::{AuditStore, CounterMetrics, FileAuditStore, TracedAuditStore};
use aw_core::{AuditConfig, AuditEntry, ConfigError};
use aw_engine::{
    AuditLog, BatchPersister, EngineError, IngestionPipeline, RecoveryProcessor, RecoveryReport,
    RetentionSweeper,
};
use aw_storage::{JsonCodec, LogOptions, WalError};
use fs2::FileExt;
use serde::Deserialize;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

/// Store with tracing, as used by the daemon
pub type DaemonStore = TracedAuditStore<FileAuditStore>;

pub type DaemonPipeline = IngestionPipeline<JsonCodec<AuditEntry>, CounterMetrics>;

pub type DaemonSweeper = RetentionSweeper<JsonCodec<AuditEntry>, DaemonStore, CounterMetrics>;

/// Daemon configuration, read from a TOML file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Root of the file-backed audit store
    pub store_path: PathBuf,
    #[serde(default)]
    pub audit: AuditConfig,
}

impl Config {
    /// Load and validate. Relative paths are resolved against the file's
    /// directory.
    pub fn load(path: &Path) -> Result<Self, LifecycleError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| LifecycleError::ConfigNotFound(path.to_path_buf(), e))?;
        let base = path.parent().unwrap_or(Path::new("."));
        Self::from_toml_str(&text, base)
    }

    pub fn from_toml_str(text: &str, base: &Path) -> Result<Self, LifecycleError> {
        let mut config: Self = toml::from_str(text).map_err(ConfigError::from)?;
        config.audit.validate()?;

        for path in [
            &mut config.socket_path,
            &mut config.lock_path,
            &mut config.log_path,
            &mut config.store_path,
            &mut config.audit.wal_folder,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        Ok(config)
    }
}

/// Daemon state during operation
pub struct DaemonState {
    /// Configuration
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Unix socket listener
    pub listener: UnixListener,
    pub pipeline: Arc<DaemonPipeline>,
    pub sweeper: Arc<DaemonSweeper>,
    pub store: DaemonStore,
    pub metrics: CounterMetrics,
    /// What recovery found and committed at startup
    pub recovery: RecoveryReport,
    /// When daemon started
    pub start_time: Instant,
    /// Shutdown requested flag
    pub shutdown_requested: bool,
}

impl DaemonState {
    /// Last sequence written to the WAL
    pub fn last_sequence(&self) -> u64 {
        self.pipeline.durable_log().sequence()
    }

    /// Committed checkpoint for this node, 0 if none yet
    pub async fn checkpoint(&self) -> Result<u64, LifecycleError> {
        let found = self
            .store
            .find_checkpoint(&self.config.audit.node_name)
            .await
            .map_err(EngineError::from)?;
        Ok(found.map_or(0, |c| c.sequence))
    }

    /// Shutdown the daemon gracefully
    ///
    /// Queued records are not drained; they are replayed from the WAL on the
    /// next start.
    pub fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        self.sweeper.shutdown();
        self.pipeline.shutdown();
        remove_runtime_files(&self.config);

        info!(last_sequence = self.last_sequence(), "Daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Config not readable at {0}: {1}")]
    ConfigNotFound(PathBuf, std::io::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Invalid log path: {0}")]
    InvalidLogPath(PathBuf),

    #[error("WAL error: {0}")]
    Wal(#[from] WalError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config).await {
        Ok(state) => Ok(state),
        // Another daemon owns the lock; its files are not ours to remove
        Err(e @ LifecycleError::LockFailed(_)) => Err(e),
        Err(e) => {
            remove_runtime_files(config);
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<DaemonState, LifecycleError> {
    let audit = &config.audit;

    // 1. Acquire lock file FIRST - prevents two writers on one WAL
    if let Some(parent) = config.lock_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    // 2. Open the WAL; the folder must already exist
    let log = Arc::new(AuditLog::open(
        &audit.wal_folder,
        LogOptions::from(audit),
        JsonCodec::new(),
    )?);
    info!(
        wal = %audit.wal_folder.display(),
        sequence = log.sequence(),
        "WAL opened"
    );

    // 3. Downstream store and pipeline (accepts `log` calls from here on)
    std::fs::create_dir_all(&config.store_path)?;
    let store = TracedAuditStore::new(FileAuditStore::new(&config.store_path));
    let metrics = CounterMetrics::new();
    let pipeline = Arc::new(IngestionPipeline::new(
        Arc::clone(&log),
        metrics.clone(),
        audit.queue_capacity,
        audit.batch_size,
    ));

    // 4. Replay the backlog to completion; this starts the pipeline
    let persister = BatchPersister::new(store.clone(), &audit.node_name);
    let recovery =
        RecoveryProcessor::new(Arc::clone(&pipeline), audit.batch_size, audit.flush_interval)
            .run(persister)
            .await?;

    // 5. Retention runs independently from here on
    let sweeper = Arc::new(RetentionSweeper::new(
        Arc::clone(&log),
        store.clone(),
        &audit.node_name,
        metrics.clone(),
    ));
    sweeper.start(audit.retention_interval);

    // 6. Bind last, so clients only see a daemon that has finished recovery.
    // We hold the lock, so any socket file left behind is stale.
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    match std::fs::remove_file(&config.socket_path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
        _ => {}
    }
    let listener = match UnixListener::bind(&config.socket_path) {
        Ok(listener) => listener,
        Err(e) => {
            sweeper.shutdown();
            pipeline.shutdown();
            return Err(LifecycleError::BindFailed(config.socket_path.clone(), e));
        }
    };

    info!(
        node = %audit.node_name,
        replayed = recovery.replayed,
        checkpoint = recovery.committed,
        "Daemon started"
    );

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        listener,
        pipeline,
        sweeper,
        store,
        metrics,
        recovery,
        start_time: Instant::now(),
        shutdown_requested: false,
    })
}

/// Remove the socket and pid file; only called by the lock holder
fn remove_runtime_files(config: &Config) {
    for (what, path) in [("socket", &config.socket_path), ("pid file", &config.lock_path)] {
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove {}", what),
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
