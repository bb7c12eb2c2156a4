// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `aw wal`: offline inspection of a WAL folder
//!
//! Reads segments without opening the log for writing, so it is safe to run
//! next to a live daemon.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use aw_storage::{list_segments, read_after, summarize, RawCodec};
use clap::Subcommand;

use crate::error::AwError;

#[derive(Subcommand, Debug)]
pub enum WalCommand {
    /// List segments with their record counts
    List {
        /// WAL folder
        folder: PathBuf,
    },
    /// Print records as `sequence<TAB>payload`
    Dump {
        /// WAL folder
        folder: PathBuf,
        /// Only records with a greater sequence
        #[arg(long, default_value_t = 0)]
        after: u64,
    },
}

pub fn handle(command: WalCommand, out: &mut impl Write) -> Result<()> {
    match command {
        WalCommand::List { folder } => list(&folder, out),
        WalCommand::Dump { folder, after } => dump(&folder, after, out),
    }
}

pub fn list(folder: &Path, out: &mut impl Write) -> Result<()> {
    ensure_folder(folder)?;
    let segments = list_segments(folder)?;
    if segments.is_empty() {
        writeln!(out, "No segments")?;
        return Ok(());
    }

    writeln!(out, "{:<26} {:>8} {:>8} {:>8}", "SEGMENT", "BASE", "LAST", "RECORDS")?;
    for segment in &segments {
        let summary = summarize(segment)?;
        let name = summary
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let last = summary
            .last_sequence
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        writeln!(
            out,
            "{:<26} {:>8} {:>8} {:>8}",
            name, summary.base, last, summary.records
        )?;
    }
    Ok(())
}

pub fn dump(folder: &Path, after: u64, out: &mut impl Write) -> Result<()> {
    ensure_folder(folder)?;
    for record in read_after(folder, &RawCodec, after)? {
        let (payload, sequence) = record?;
        writeln!(out, "{}\t{}", sequence, payload)?;
    }
    Ok(())
}

fn ensure_folder(folder: &Path) -> Result<(), AwError> {
    if folder.is_dir() {
        Ok(())
    } else {
        Err(AwError::wal_folder_missing(folder))
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
