// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! aw-core: domain types for the write-ahead audit pipeline
//!
//! This crate provides:
//! - The audit payload (`AuditEntry`), its committed form (`SequencedEntry`)
//!   and the per-node `Checkpoint`
//! - `AuditEvent`, the unit of work flowing through the ingestion queue
//! - `AuditConfig`, the configuration surface of the pipeline
//! - Metric counter names and id generation

pub mod checkpoint;
pub mod config;
pub mod entry;
pub mod event;
pub mod id;
pub mod metrics;

pub use checkpoint::Checkpoint;
pub use config::{AuditConfig, ConfigError, SyncMode};
pub use entry::{AuditEntry, SequencedEntry};
pub use event::AuditEvent;
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
