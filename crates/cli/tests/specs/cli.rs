// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level CLI behavior

use crate::prelude::*;
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_commands() {
    let temp = Project::empty();
    temp.aw()
        .args(&["--help"])
        .passes()
        .stdout_has("status")
        .stdout_has("stop")
        .stdout_has("log")
        .stdout_has("wal");
}

#[test]
fn version_prints_package_version() {
    Command::cargo_bin("aw")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("aw ")
                .and(predicate::str::contains(env!("CARGO_PKG_VERSION"))),
        );
}

#[test]
fn no_command_prints_usage() {
    Command::cargo_bin("aw")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: aw"));
}

#[test]
fn unknown_command_fails() {
    let temp = Project::empty();
    temp.aw()
        .args(&["replicate"])
        .fails()
        .stderr_has("unrecognized subcommand");
}
