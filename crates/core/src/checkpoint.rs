// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable commit cursor, one per writer node

use serde::{Deserialize, Serialize};

/// Highest WAL sequence fully committed downstream for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub node_name: String,
    pub sequence: u64,
}

impl Checkpoint {
    /// A fresh checkpoint; nothing has been committed yet
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            sequence: 0,
        }
    }

    /// Move the cursor forward. Never moves it backwards.
    pub fn advance_to(&mut self, sequence: u64) {
        self.sequence = self.sequence.max(sequence);
    }
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
