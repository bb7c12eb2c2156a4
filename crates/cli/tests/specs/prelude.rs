// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for CLI specs

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Scratch directory with a daemon config whose paths all live inside it
pub struct Project {
    dir: TempDir,
}

impl Project {
    /// Config written, WAL folder created, no daemon started
    pub fn empty() -> Self {
        let project = Self {
            dir: TempDir::new().unwrap(),
        };
        std::fs::create_dir(project.path().join("wal")).unwrap();
        project.file(
            "awd.toml",
            r#"
socket_path = "awd.sock"
lock_path = "awd.pid"
log_path = "awd.log"
store_path = "store"

[audit]
wal_folder = "wal"
max_records_per_segment = 10
"#,
        );
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn wal(&self) -> PathBuf {
        self.path().join("wal")
    }

    pub fn file(&self, relative: &str, contents: &str) {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    /// Write a segment file by hand; `records` are (sequence, payload)
    pub fn segment(&self, base: u64, records: &[(u64, &str)]) {
        let body: String = records
            .iter()
            .map(|(seq, payload)| format!("{},{}\n", seq, payload))
            .collect();
        self.file(&format!("wal/audit.{:020}", base), &body);
    }

    /// `aw` pointed at this project's config
    pub fn aw(&self) -> Cli {
        let mut cmd = Command::cargo_bin("aw").unwrap();
        cmd.current_dir(self.path())
            .env("AW_CONFIG", self.path().join("awd.toml"))
            .env("AW_TIMEOUT_IPC_MS", "500")
            .env_remove("RUST_LOG");
        Cli { cmd }
    }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> Output {
        let output = self.cmd.output().unwrap();
        let out = Output::from(output);
        assert!(
            out.success,
            "expected success\nstdout:\n{}\nstderr:\n{}",
            out.stdout, out.stderr
        );
        out
    }

    pub fn fails(mut self) -> Output {
        let output = self.cmd.output().unwrap();
        let out = Output::from(output);
        assert!(
            !out.success,
            "expected failure\nstdout:\n{}\nstderr:\n{}",
            out.stdout, out.stderr
        );
        out
    }
}

pub struct Output {
    success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl From<std::process::Output> for Output {
    fn from(output: std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl Output {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(
            self.stdout.contains(needle),
            "stdout missing {:?}\nstdout:\n{}",
            needle,
            self.stdout
        );
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(
            !self.stdout.contains(needle),
            "stdout unexpectedly has {:?}\nstdout:\n{}",
            needle,
            self.stdout
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(
            self.stderr.contains(needle),
            "stderr missing {:?}\nstderr:\n{}",
            needle,
            self.stderr
        );
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout, expected);
        self
    }
}
