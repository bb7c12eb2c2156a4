// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk segment files: naming, listing, and line parsing
//!
//! A segment named `audit.<base>` (base zero-padded to 20 digits) holds the
//! records with sequence strictly greater than `base`, one per line, as
//! `<sequence>,<payload>\n`.

use crate::log::WalError;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

pub const SEGMENT_PREFIX: &str = "audit.";

const BASE_DIGITS: usize = 20;

/// File name for the segment starting after `base`
pub fn segment_name(base: u64) -> String {
    format!("{SEGMENT_PREFIX}{base:020}")
}

/// Inverse of [`segment_name`]; `None` for anything else in the folder
pub fn parse_segment_name(name: &str) -> Option<u64> {
    let digits = name.strip_prefix(SEGMENT_PREFIX)?;
    if digits.len() != BASE_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub base: u64,
    pub path: PathBuf,
}

/// Segments in `folder`, sorted by base
pub fn list_segments(folder: &Path) -> Result<Vec<Segment>, WalError> {
    let mut segments = Vec::new();
    for dir_entry in fs::read_dir(folder)? {
        let dir_entry = dir_entry?;
        let name = dir_entry.file_name();
        let Some(base) = name.to_str().and_then(parse_segment_name) else {
            continue;
        };
        if dir_entry.file_type()?.is_file() {
            segments.push(Segment {
                base,
                path: dir_entry.path(),
            });
        }
    }
    segments.sort_by_key(|s| s.base);
    Ok(segments)
}

/// Split a line into its sequence and payload text
pub(crate) fn parse_line<'a>(path: &Path, line: &'a str) -> Result<(u64, &'a str), WalError> {
    let corrupt = |reason: &str| WalError::Corrupt {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };
    let (seq, body) = line
        .split_once(',')
        .ok_or_else(|| corrupt("line has no sequence separator"))?;
    let seq = seq
        .parse::<u64>()
        .map_err(|_| corrupt(&format!("bad sequence number {seq:?}")))?;
    Ok((seq, body))
}

/// Complete lines of one segment.
///
/// Stops at a trailing line with no newline: that is an append still in
/// progress (or torn by a crash) and is never surfaced.
pub(crate) struct SegmentLines {
    path: PathBuf,
    reader: BufReader<File>,
    buf: String,
}

impl SegmentLines {
    pub(crate) fn open(path: &Path) -> Result<Self, WalError> {
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(File::open(path)?),
            buf: String::new(),
        })
    }
}

impl Iterator for SegmentLines {
    type Item = Result<(u64, String), WalError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            let Some(line) = self.buf.strip_suffix('\n') else {
                return None;
            };
            if line.is_empty() {
                continue;
            }
            return Some(parse_line(&self.path, line).map(|(seq, body)| (seq, body.to_string())));
        }
    }
}

/// Record count and last sequence of one segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSummary {
    pub base: u64,
    pub path: PathBuf,
    pub records: u64,
    pub last_sequence: Option<u64>,
}

pub fn summarize(segment: &Segment) -> Result<SegmentSummary, WalError> {
    let mut records = 0;
    let mut last_sequence = None;
    for line in SegmentLines::open(&segment.path)? {
        let (seq, _) = line?;
        records += 1;
        last_sequence = Some(seq);
    }
    Ok(SegmentSummary {
        base: segment.base,
        path: segment.path.clone(),
        records,
        last_sequence,
    })
}

#[cfg(test)]
#[path = "segment_tests.rs"]
mod tests;
