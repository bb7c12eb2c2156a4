// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! awd: owns the audit WAL and serves the control socket

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use aw_daemon::lifecycle::{self, Config, DaemonState, LifecycleError};
use aw_daemon::server;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

/// Line appended to the daemon log before logging is set up, so every run
/// is delimited even when startup fails early.
const STARTUP_MARKER: &str = "--- awd: starting";

#[derive(Debug, Clone, Copy)]
enum StopReason {
    Terminated,
    Interrupted,
    Requested,
}

#[tokio::main]
async fn main() -> ExitCode {
    let Some(config_path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("usage: awd <config.toml>");
        return ExitCode::from(2);
    };

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("awd: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&config, &config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("awd: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config, config_path: &Path) -> Result<(), LifecycleError> {
    append_to_log(
        &config.log_path,
        &format!("{} (pid: {}) ---", STARTUP_MARKER, std::process::id()),
    )?;
    let _log_guard = init_logging(&config.log_path)?;
    info!(config = %config_path.display(), "starting awd");

    let mut daemon = match lifecycle::startup(config).await {
        Ok(daemon) => daemon,
        Err(e) => {
            // The non-blocking writer may drop this on exit; write it directly too
            let line = format!("ERROR Failed to start daemon: {}", e);
            let _ = append_to_log(&config.log_path, &line);
            error!(error = %e, "startup failed");
            return Err(e);
        }
    };

    info!(
        socket = %config.socket_path.display(),
        recovered = daemon.recovery.replayed,
        "awd ready"
    );
    println!("READY");

    let reason = serve(&mut daemon).await?;
    info!(?reason, "stopping awd");
    daemon.shutdown()
}

/// Accept control connections one at a time until asked to stop
async fn serve(daemon: &mut DaemonState) -> Result<StopReason, LifecycleError> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        tokio::select! {
            accepted = daemon.listener.accept() => match accepted {
                Ok((stream, _)) => {
                    if let Err(e) = server::handle_connection(daemon, stream).await {
                        warn!(error = %e, "control connection failed");
                    }
                    if daemon.shutdown_requested {
                        return Ok(StopReason::Requested);
                    }
                }
                Err(e) => error!(error = %e, "accept failed"),
            },
            _ = sigterm.recv() => return Ok(StopReason::Terminated),
            _ = sigint.recv() => return Ok(StopReason::Interrupted),
        }
    }
}

fn append_to_log(log_path: &Path, line: &str) -> Result<(), LifecycleError> {
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(log_path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}

fn init_logging(log_path: &Path) -> Result<WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (Some(dir), Some(file_name)) = (log_path.parent(), log_path.file_name()) else {
        return Err(LifecycleError::InvalidLogPath(log_path.to_path_buf()));
    };
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Ok(guard)
}
