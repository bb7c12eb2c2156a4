// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Segmented, sequence-numbered write-ahead log

use crate::codec::PayloadCodec;
use crate::segment::{self, list_segments, segment_name, Segment, SegmentLines};
use aw_core::{AuditConfig, SyncMode};
use std::collections::VecDeque;
use std::error::Error;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur in WAL operations
#[derive(Debug, Error)]
pub enum WalError {
    #[error("WAL folder {0} does not exist or is not a directory")]
    InvalidFolder(PathBuf),

    #[error("max records per segment must be positive")]
    InvalidSegmentSize,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("payload codec error: {0}")]
    Codec(Box<dyn Error + Send + Sync>),

    #[error("corrupt segment {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("cannot retain past sequence {head}: checkpoint is at {requested}")]
    RetainBeyondHead { requested: u64, head: u64 },
}

impl WalError {
    fn codec(err: impl Error + Send + Sync + 'static) -> Self {
        WalError::Codec(Box::new(err))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    pub max_records_per_segment: u64,
    pub sync: SyncMode,
}

impl LogOptions {
    pub fn new(max_records_per_segment: u64) -> Self {
        Self {
            max_records_per_segment,
            sync: SyncMode::default(),
        }
    }

    pub fn with_sync(mut self, sync: SyncMode) -> Self {
        self.sync = sync;
        self
    }
}

impl From<&AuditConfig> for LogOptions {
    fn from(config: &AuditConfig) -> Self {
        Self::new(config.max_records_per_segment).with_sync(config.sync)
    }
}

/// The open segment and the last sequence written to it
struct Writer {
    file: File,
    base: u64,
    /// Byte length of the file after the last successful append
    len: u64,
    sequence: u64,
}

impl Writer {
    fn write_line(&mut self, line: &[u8], sync: SyncMode) -> io::Result<()> {
        self.file.write_all(line)?;
        self.file.flush()?;
        if sync == SyncMode::Fsync {
            self.file.sync_data()?;
        }
        Ok(())
    }

    /// Drop any bytes a failed append left behind
    fn rollback(&mut self) {
        if let Err(e) = self.file.set_len(self.len) {
            warn!(error = %e, len = self.len, "failed to roll back partial WAL write");
        }
    }

    fn is_full(&self, max_records: u64) -> bool {
        self.sequence > self.base && self.sequence % max_records == 0
    }
}

/// Crash-safe append log of audit payloads.
///
/// Appends are serialized through one mutex that owns the current segment.
/// Readers (`replay_after`, `retain`) work from a directory listing and only
/// touch that mutex to snapshot the head.
pub struct DurableLog<C: PayloadCodec> {
    folder: PathBuf,
    options: LogOptions,
    codec: C,
    head: AtomicU64,
    writer: Mutex<Writer>,
}

impl<C: PayloadCodec> DurableLog<C> {
    /// Open the log in `folder`, resuming after the last record on disk
    pub fn open(folder: impl AsRef<Path>, options: LogOptions, codec: C) -> Result<Self, WalError> {
        let folder = folder.as_ref().to_path_buf();
        if options.max_records_per_segment == 0 {
            return Err(WalError::InvalidSegmentSize);
        }
        if !fs::metadata(&folder).map(|m| m.is_dir()).unwrap_or(false) {
            return Err(WalError::InvalidFolder(folder));
        }

        let mut writer = match list_segments(&folder)?.pop() {
            Some(current) => resume(&current)?,
            None => create_segment(&folder, 0, options.sync)?,
        };
        if writer.is_full(options.max_records_per_segment) {
            // Crashed between the last write and the rotation
            writer = create_segment(&folder, writer.sequence, options.sync)?;
        }
        debug!(
            folder = %folder.display(),
            sequence = writer.sequence,
            segment = %segment_name(writer.base),
            "opened WAL"
        );

        Ok(Self {
            head: AtomicU64::new(writer.sequence),
            folder,
            options,
            codec,
            writer: Mutex::new(writer),
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Last sequence written
    pub fn sequence(&self) -> u64 {
        self.head.load(Ordering::Acquire)
    }

    /// Write one record and return its sequence.
    ///
    /// The sequence only advances once the line is fully written, so a failed
    /// append leaves no gap.
    pub fn append(&self, payload: &C::Payload) -> Result<u64, WalError> {
        let body = self.codec.encode(payload).map_err(WalError::codec)?;
        if body.contains('\n') {
            return Err(WalError::Codec("encoded payload contains a newline".into()));
        }

        let max_records = self.options.max_records_per_segment;
        let mut writer = self.lock();
        if writer.is_full(max_records) {
            // Rotation after the previous append failed; retry before writing
            *writer = create_segment(&self.folder, writer.sequence, self.options.sync)?;
        }

        let sequence = writer.sequence + 1;
        let line = format!("{sequence},{body}\n");
        if let Err(e) = writer.write_line(line.as_bytes(), self.options.sync) {
            writer.rollback();
            return Err(e.into());
        }
        writer.len += line.len() as u64;
        writer.sequence = sequence;
        self.head.store(sequence, Ordering::Release);

        if writer.is_full(max_records) {
            match create_segment(&self.folder, sequence, self.options.sync) {
                Ok(next) => *writer = next,
                Err(e) => warn!(error = %e, sequence, "WAL rotation failed, retrying on next append"),
            }
        }
        Ok(sequence)
    }

    /// Records with sequence greater than `after`, in ascending order.
    ///
    /// The head is snapshotted here: records appended while the iterator is
    /// being consumed are not yielded.
    pub fn replay_after(&self, after: u64) -> Result<Replay<'_, C>, WalError> {
        let horizon = self.sequence();
        Replay::new(&self.folder, &self.codec, after, horizon)
    }

    /// Delete every rotated segment whose records are all `<= committed`.
    ///
    /// Returns the number of segments removed. The current segment is always
    /// kept. Unreadable segments are logged and left for the next pass.
    pub fn retain(&self, committed: u64) -> Result<usize, WalError> {
        let (head, current_base) = {
            let writer = self.lock();
            (writer.sequence, writer.base)
        };
        if committed > head {
            return Err(WalError::RetainBeyondHead {
                requested: committed,
                head,
            });
        }

        let mut removed = 0;
        for segment in list_segments(&self.folder)? {
            if segment.base >= current_base {
                continue;
            }
            let last = match segment::summarize(&segment) {
                Ok(summary) => summary.last_sequence.unwrap_or(segment.base),
                Err(e) => {
                    warn!(segment = %segment.path.display(), error = %e, "skipping unreadable segment");
                    continue;
                }
            };
            if last > committed {
                continue;
            }
            match fs::remove_file(&segment.path) {
                Ok(()) => {
                    debug!(segment = %segment.path.display(), last, "removed committed segment");
                    removed += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(segment = %segment.path.display(), error = %e, "failed to remove segment")
                }
            }
        }
        Ok(removed)
    }

    fn lock(&self) -> MutexGuard<'_, Writer> {
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Read a folder without opening it for writing; there is no horizon, so
/// every complete line past `after` is yielded.
pub fn read_after<'a, C: PayloadCodec>(
    folder: &Path,
    codec: &'a C,
    after: u64,
) -> Result<Replay<'a, C>, WalError> {
    Replay::new(folder, codec, after, u64::MAX)
}

/// Lazy replay over one or more segments.
///
/// Yields `(payload, sequence)` and stops for good after the first error.
pub struct Replay<'a, C: PayloadCodec> {
    codec: &'a C,
    pending: VecDeque<Segment>,
    lines: Option<SegmentLines>,
    after: u64,
    horizon: u64,
    done: bool,
}

impl<'a, C: PayloadCodec> Replay<'a, C> {
    fn new(folder: &Path, codec: &'a C, after: u64, horizon: u64) -> Result<Self, WalError> {
        let mut segments = list_segments(folder)?;
        let start = start_index(&segments, after);
        let pending: VecDeque<Segment> = segments.drain(start..).collect();
        Ok(Self {
            codec,
            pending,
            lines: None,
            after,
            horizon,
            done: after >= horizon,
        })
    }

    /// Last sequence this replay will yield up to
    pub fn horizon(&self) -> u64 {
        self.horizon
    }

    fn fail(&mut self, err: WalError) -> Option<Result<(C::Payload, u64), WalError>> {
        self.done = true;
        Some(Err(err))
    }
}

impl<C: PayloadCodec> Iterator for Replay<'_, C> {
    type Item = Result<(C::Payload, u64), WalError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if self.lines.is_none() {
                let Some(segment) = self.pending.pop_front() else {
                    self.done = true;
                    break;
                };
                match SegmentLines::open(&segment.path) {
                    Ok(lines) => self.lines = Some(lines),
                    Err(e) => return self.fail(e),
                }
            }
            let Some(lines) = self.lines.as_mut() else {
                continue;
            };

            match lines.next() {
                None => self.lines = None,
                Some(Err(e)) => return self.fail(e),
                Some(Ok((seq, _))) if seq <= self.after => {}
                Some(Ok((seq, _))) if seq > self.horizon => self.done = true,
                Some(Ok((seq, body))) => {
                    return match self.codec.decode(&body) {
                        Ok(payload) => Some(Ok((payload, seq))),
                        Err(e) => self.fail(WalError::codec(e)),
                    };
                }
            }
        }
        None
    }
}

/// Index of the segment holding `after + 1`.
///
/// An exact match on a base means that segment starts right after the cutoff;
/// otherwise the cutoff falls inside the segment before the insertion point.
fn start_index(segments: &[Segment], after: u64) -> usize {
    match segments.binary_search_by_key(&after, |s| s.base) {
        Ok(i) => i,
        Err(insertion) => insertion.saturating_sub(1),
    }
}

fn create_segment(folder: &Path, base: u64, sync: SyncMode) -> Result<Writer, WalError> {
    let path = folder.join(segment_name(base));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    if sync == SyncMode::Fsync {
        file.sync_all()?;
    }
    let len = file.metadata()?.len();
    debug!(segment = %path.display(), "created WAL segment");
    Ok(Writer {
        file,
        base,
        len,
        sequence: base,
    })
}

/// Reopen the newest segment, cutting off a torn final line
fn resume(current: &Segment) -> Result<Writer, WalError> {
    let bytes = fs::read(&current.path)?;
    let valid = bytes
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |pos| pos + 1);

    let file = OpenOptions::new().append(true).open(&current.path)?;
    if valid < bytes.len() {
        warn!(
            segment = %current.path.display(),
            dropped_bytes = bytes.len() - valid,
            "truncating torn record at end of WAL segment"
        );
        file.set_len(valid as u64)?;
    }

    let text = String::from_utf8_lossy(&bytes[..valid]);
    let sequence = match text.lines().rev().find(|l| !l.is_empty()) {
        Some(line) => segment::parse_line(&current.path, line)?.0,
        None => current.base,
    };

    Ok(Writer {
        file,
        base: current.base,
        len: valid as u64,
        sequence,
    })
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
