// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error counters

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Sink for named counters.
///
/// Called from the synchronous `log` path, so it must not block.
pub trait MetricsSink: Clone + Send + Sync + 'static {
    fn increment(&self, name: &str);
}

/// In-process counters, shared across clones
#[derive(Clone, Debug, Default)]
pub struct CounterMetrics {
    counters: Arc<Mutex<BTreeMap<String, u64>>>,
}

impl CounterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> u64 {
        self.counters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    /// All counters seen so far
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl MetricsSink for CounterMetrics {
    fn increment(&self, name: &str) {
        *self
            .counters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(name.to_string())
            .or_insert(0) += 1;
    }
}

/// Discards everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpMetrics;

impl MetricsSink for NoOpMetrics {
    fn increment(&self, _name: &str) {}
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
