// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The audit payload written to the WAL and committed downstream

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single audited access to a resource.
///
/// The WAL treats this as an opaque value: it is serialized once on append
/// and deserialized on replay, never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Assigned by the downstream store; absent until committed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub project_id: String,
    /// Kind of resource touched (e.g. "SECRET", "PROJECT")
    pub resource_type: String,
    pub resource_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<u32>,
    /// What was done (e.g. "READ_SECRET")
    pub action: String,
    pub user_id: String,
    /// Delegating principal, for delegated requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    /// Client address and forwarded headers
    #[serde(default)]
    pub ips: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl AuditEntry {
    pub fn new(
        project_id: impl Into<String>,
        resource_type: impl Into<String>,
        resource_name: impl Into<String>,
        action: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            project_id: project_id.into(),
            resource_type: resource_type.into(),
            resource_name: resource_name.into(),
            resource_version: None,
            action: action.into(),
            user_id: user_id.into(),
            actor_id: None,
            ips: BTreeMap::new(),
            timestamp: Utc::now(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.resource_version = Some(version);
        self
    }

    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    pub fn with_ip(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.ips.insert(header.into(), value.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// An entry tagged with the WAL position it was logged at.
///
/// This is what the downstream store receives. `(node_name, sequence)` is
/// stable across redeliveries, so a batch retried after a failed checkpoint
/// save shows up as repeated keys rather than new records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedEntry {
    pub node_name: String,
    pub sequence: u64,
    #[serde(flatten)]
    pub entry: AuditEntry,
}

impl SequencedEntry {
    pub fn new(node_name: impl Into<String>, sequence: u64, entry: AuditEntry) -> Self {
        Self {
            node_name: node_name.into(),
            sequence,
            entry,
        }
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
