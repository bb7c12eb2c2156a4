// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-facing commands without a running daemon

use crate::prelude::*;

#[test]
fn status_when_not_running() {
    let temp = Project::empty();
    temp.aw()
        .args(&["status"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn stop_when_not_running() {
    let temp = Project::empty();
    temp.aw()
        .args(&["stop"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn status_with_stale_socket_reports_not_running() {
    let temp = Project::empty();
    drop(std::os::unix::net::UnixListener::bind(temp.path().join("awd.sock")).unwrap());

    temp.aw()
        .args(&["status"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn log_fails_when_not_running() {
    let temp = Project::empty();
    temp.aw()
        .args(&[
            "log",
            "--project",
            "proj",
            "--resource-type",
            "SECRET",
            "--resource-name",
            "db-password",
            "--action",
            "READ_SECRET",
            "--user",
            "alice",
        ])
        .fails()
        .stderr_has("Daemon not running")
        .stderr_has("awd <config.toml>");
}

#[test]
fn log_rejects_malformed_metadata() {
    let temp = Project::empty();
    temp.aw()
        .args(&[
            "log",
            "--project",
            "p",
            "--resource-type",
            "t",
            "--resource-name",
            "n",
            "--action",
            "a",
            "--user",
            "u",
            "--meta",
            "no-equals",
        ])
        .fails()
        .stderr_has("expected KEY=VALUE");
}

#[test]
fn explicit_config_flag_overrides_env() {
    let temp = Project::empty();
    temp.aw()
        .args(&["--config", "missing.toml", "status"])
        .fails()
        .stderr_has("Config not readable");
}

#[test]
fn invalid_config_is_rejected() {
    let temp = Project::empty();
    temp.file(
        "bad.toml",
        r#"
socket_path = "awd.sock"
lock_path = "awd.pid"
log_path = "awd.log"
store_path = "store"

[audit]
max_records_per_segment = 0
"#,
    );
    temp.aw()
        .args(&["--config", "bad.toml", "status"])
        .fails()
        .stderr_has("Invalid config");
}
