// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed audit store
//!
//! Layout under the root directory:
//! - `records.jsonl`: one committed record per line, tagged with its node
//!   name and WAL sequence
//! - `checkpoints/<node>.json`: one checkpoint per node

use super::{AuditStore, StoreError};
use async_trait::async_trait;
use aw_core::{Checkpoint, IdGen, SequencedEntry, UuidIdGen};
use std::io::{self, ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::warn;

const RECORDS_FILE: &str = "records.jsonl";
const CHECKPOINT_DIR: &str = "checkpoints";

/// Stores entries as JSON lines and checkpoints as small JSON files
#[derive(Clone)]
pub struct FileAuditStore<I: IdGen = UuidIdGen> {
    root: PathBuf,
    ids: I,
    records_lock: Arc<Mutex<()>>,
}

impl FileAuditStore<UuidIdGen> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_ids(root, UuidIdGen)
    }
}

impl<I: IdGen> FileAuditStore<I> {
    pub fn with_ids(root: impl Into<PathBuf>, ids: I) -> Self {
        Self {
            root: root.into(),
            ids,
            records_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every committed record, in commit order.
    ///
    /// An unterminated last line is a torn write and is skipped.
    pub async fn records(&self) -> Result<Vec<SequencedEntry>, StoreError> {
        let text = match tokio::fs::read_to_string(self.root.join(RECORDS_FILE)).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let complete = text.rfind('\n').map_or("", |i| &text[..=i]);
        if complete.len() < text.len() {
            warn!(
                bytes = text.len() - complete.len(),
                "ignoring torn tail of records file"
            );
        }
        complete
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| serde_json::from_str(line).map_err(StoreError::from))
            .collect()
    }

    fn checkpoint_path(&self, node_name: &str) -> Result<PathBuf, StoreError> {
        let valid = !node_name.is_empty()
            && !node_name.starts_with('.')
            && node_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StoreError::InvalidNodeName(node_name.to_string()));
        }
        Ok(self
            .root
            .join(CHECKPOINT_DIR)
            .join(format!("{node_name}.json")))
    }
}

#[async_trait]
impl<I: IdGen> AuditStore for FileAuditStore<I> {
    async fn insert_all(&self, records: &[SequencedEntry]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut batch = String::new();
        for record in records {
            let line = match record.entry.id {
                Some(_) => serde_json::to_string(record)?,
                None => {
                    let mut record = record.clone();
                    record.entry.id = Some(self.ids.next());
                    serde_json::to_string(&record)?
                }
            };
            batch.push_str(&line);
            batch.push('\n');
        }

        // One write per batch, serialized across clones
        let _guard = self.records_lock.lock().await;
        tokio::fs::create_dir_all(&self.root).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(self.root.join(RECORDS_FILE))
            .await?;
        let committed_len = trim_torn_tail(&mut file).await?;
        if let Err(e) = append_batch(&mut file, batch.as_bytes()).await {
            if let Err(rollback) = file.set_len(committed_len).await {
                warn!(error = %rollback, "failed to roll back partial batch");
            }
            return Err(e.into());
        }
        Ok(())
    }

    async fn find_checkpoint(&self, node_name: &str) -> Result<Option<Checkpoint>, StoreError> {
        let path = self.checkpoint_path(node_name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<(), StoreError> {
        let path = self.checkpoint_path(&checkpoint.node_name)?;
        let tmp = path.with_extension("json.tmp");
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&serde_json::to_vec(checkpoint)?).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

async fn append_batch(file: &mut File, bytes: &[u8]) -> io::Result<()> {
    file.write_all(bytes).await?;
    file.sync_data().await
}

/// Cut anything after the last newline; returns the remaining length
async fn trim_torn_tail(file: &mut File) -> io::Result<u64> {
    let len = file.metadata().await?.len();
    if len == 0 {
        return Ok(0);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1)).await?;
    file.read_exact(&mut last).await?;
    if last[0] == b'\n' {
        return Ok(len);
    }

    file.seek(SeekFrom::Start(0)).await?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents).await?;
    let complete = contents
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |i| i as u64 + 1);
    warn!(bytes = len - complete, "truncating torn tail of records file");
    file.set_len(complete).await?;
    Ok(complete)
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
