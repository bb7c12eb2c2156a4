// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the audit engine

use aw_adapters::StoreError;
use aw_storage::WalError;
use thiserror::Error;

/// Errors that can occur in the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("WAL error: {0}")]
    Wal(#[from] WalError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("checkpoint {checkpoint} is ahead of WAL head {head}")]
    CheckpointAhead { checkpoint: u64, head: u64 },
    #[error("ingestion pipeline already started")]
    AlreadyStarted,
}
