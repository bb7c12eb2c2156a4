// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration for the audit pipeline

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("max_records_per_segment must be positive")]
    ZeroSegmentSize,

    #[error("queue_capacity must be positive")]
    ZeroQueueCapacity,

    #[error("{0} must be a non-zero duration")]
    ZeroInterval(&'static str),

    #[error("node_name must not be empty")]
    EmptyNodeName,
}

/// How hard each WAL write is pushed to storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Flush to the OS; survives a process crash
    #[default]
    Flush,
    /// Also sync file data to the device; survives power loss
    Fsync,
}

/// Settings for the write-ahead log, batching, and retention.
///
/// Every field except `wal_folder` has a default, so a minimal config is
/// a single line naming the folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    pub wal_folder: PathBuf,
    pub max_records_per_segment: u64,
    pub queue_capacity: usize,
    /// Records per downstream batch; 0 disables size-triggered flushes
    pub batch_size: u64,
    #[serde(with = "humantime_serde")]
    pub flush_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub retention_interval: Duration,
    pub node_name: String,
    pub sync: SyncMode,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            wal_folder: PathBuf::from("wal"),
            max_records_per_segment: 10_000,
            queue_capacity: 65_536,
            batch_size: 100,
            flush_interval: Duration::from_secs(5),
            retention_interval: Duration::from_secs(60),
            node_name: "node-0".to_string(),
            sync: SyncMode::Flush,
        }
    }
}

impl AuditConfig {
    /// Parse from TOML and validate
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_records_per_segment == 0 {
            return Err(ConfigError::ZeroSegmentSize);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.flush_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("flush_interval"));
        }
        if self.retention_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("retention_interval"));
        }
        if self.node_name.trim().is_empty() {
            return Err(ConfigError::EmptyNodeName);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
