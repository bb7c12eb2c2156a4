// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing errors with context and suggestions.

use std::fmt;
use std::path::Path;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct AwError {
    pub message: String,
    pub context: Vec<String>,
    pub suggestions: Vec<String>,
}

impl AwError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// The daemon socket is missing or refuses connections.
    pub fn daemon_not_running(socket_path: &Path) -> Self {
        AwError::new("Daemon not running")
            .with_context(format!("No daemon is listening on {}", socket_path.display()))
            .with_suggestion("Start it with: awd <config.toml>")
            .with_suggestion("Check the daemon log for startup errors")
    }

    /// A folder passed to `aw wal` does not exist.
    pub fn wal_folder_missing(folder: &Path) -> Self {
        AwError::new(format!("WAL folder not found: {}", folder.display()))
            .with_suggestion("Pass the `wal_folder` from the daemon config")
    }
}

impl fmt::Display for AwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        for ctx in &self.context {
            write!(f, "\n  -> {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n\nsuggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                write!(f, "\n  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for AwError {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
