// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::protocol::{Request, Response};
use crate::server::handle_request;
use std::time::Duration;
use tempfile::TempDir;

fn config_text(dir: &Path) -> String {
    format!(
        r#"
        socket_path = "{root}/awd.sock"
        lock_path = "{root}/awd.pid"
        log_path = "{root}/awd.log"
        store_path = "{root}/store"

        [audit]
        wal_folder = "{root}/wal"
        max_records_per_segment = 10
        batch_size = 5
        flush_interval = "1h"
        retention_interval = "1h"
        node_name = "node-a"
        "#,
        root = dir.display()
    )
}

fn setup() -> (TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("wal")).unwrap();
    let config = Config::from_toml_str(&config_text(dir.path()), dir.path()).unwrap();
    (dir, config)
}

fn entry(n: u64) -> AuditEntry {
    AuditEntry::new("proj", "SECRET", format!("secret-{n}"), "READ_SECRET", "alice")
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn relative_paths_resolve_against_config_dir() {
    let text = r#"
        socket_path = "run/awd.sock"
        lock_path = "/var/run/awd.pid"
        log_path = "awd.log"
        store_path = "store"

        [audit]
        wal_folder = "wal"
    "#;
    let config = Config::from_toml_str(text, Path::new("/etc/aw")).unwrap();

    assert_eq!(config.socket_path, PathBuf::from("/etc/aw/run/awd.sock"));
    assert_eq!(config.lock_path, PathBuf::from("/var/run/awd.pid"));
    assert_eq!(config.audit.wal_folder, PathBuf::from("/etc/aw/wal"));
    assert_eq!(config.audit.batch_size, 100);
}

#[test]
fn invalid_audit_settings_are_rejected() {
    let text = r#"
        socket_path = "s"
        lock_path = "l"
        log_path = "g"
        store_path = "d"

        [audit]
        max_records_per_segment = 0
    "#;
    let err = Config::from_toml_str(text, Path::new("/")).unwrap_err();
    assert!(matches!(err, LifecycleError::Config(ConfigError::ZeroSegmentSize)));
}

#[test]
fn missing_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, LifecycleError::ConfigNotFound(..)));
}

#[test]
fn load_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("awd.toml");
    std::fs::write(&path, config_text(dir.path())).unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.audit.node_name, "node-a");
    assert_eq!(config.audit.flush_interval, Duration::from_secs(3600));
}

// =============================================================================
// Startup and shutdown
// =============================================================================

#[tokio::test]
async fn startup_recovers_backlog_and_binds_socket() {
    let (_dir, config) = setup();
    {
        let log = AuditLog::open(&config.audit.wal_folder, LogOptions::new(10), JsonCodec::new()).unwrap();
        for n in 1..=12 {
            log.append(&entry(n)).unwrap();
        }
    }

    let mut daemon = startup(&config).await.unwrap();

    assert_eq!(daemon.recovery.replayed, 12);
    assert_eq!(daemon.recovery.committed, 12);
    assert_eq!(daemon.checkpoint().await.unwrap(), 12);
    assert!(config.socket_path.exists());
    let pid = std::fs::read_to_string(&config.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());

    daemon.shutdown().unwrap();
    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
}

#[tokio::test]
async fn second_daemon_cannot_take_the_lock() {
    let (_dir, config) = setup();
    let mut first = startup(&config).await.unwrap();

    let second = startup(&config).await;

    assert!(matches!(second, Err(LifecycleError::LockFailed(_))));
    assert!(config.socket_path.exists());
    assert!(config.lock_path.exists());
    first.shutdown().unwrap();
}

#[tokio::test]
async fn missing_wal_folder_fails_startup_and_cleans_up() {
    let (dir, config) = setup();
    std::fs::remove_dir(dir.path().join("wal")).unwrap();

    let result = startup(&config).await;

    assert!(matches!(
        result,
        Err(LifecycleError::Wal(WalError::InvalidFolder(_)))
    ));
    assert!(!config.lock_path.exists());
    assert!(!config.socket_path.exists());
}

// =============================================================================
// Requests
// =============================================================================

#[tokio::test]
async fn requests_drive_the_pipeline() {
    let (_dir, config) = setup();
    let mut daemon = startup(&config).await.unwrap();

    assert_eq!(handle_request(&mut daemon, Request::Ping).await, Response::Pong);
    assert!(matches!(
        handle_request(&mut daemon, Request::Hello { version: "0".into() }).await,
        Response::Hello { .. }
    ));

    for n in 1..=5 {
        let response = handle_request(&mut daemon, Request::Log { entry: entry(n) }).await;
        assert_eq!(response, Response::Logged);
    }
    assert_eq!(daemon.last_sequence(), 5);

    // batch_size = 5: the consumer commits the batch on the fifth record
    let mut checkpoint = 0;
    for _ in 0..200 {
        checkpoint = daemon.checkpoint().await.unwrap();
        if checkpoint == 5 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(checkpoint, 5);

    let Response::Status {
        last_sequence,
        checkpoint,
        counters,
        ..
    } = handle_request(&mut daemon, Request::Status).await
    else {
        panic!("expected status");
    };
    assert_eq!(last_sequence, 5);
    assert_eq!(checkpoint, 5);
    assert!(counters.is_empty());

    assert_eq!(
        handle_request(&mut daemon, Request::Shutdown).await,
        Response::ShuttingDown
    );
    assert!(daemon.shutdown_requested);
    daemon.shutdown().unwrap();
}
