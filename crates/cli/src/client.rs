// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use aw_core::AuditEntry;
use aw_daemon::protocol::{self, ProtocolError};
use aw_daemon::{Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;
use tracing::debug;

// Timeout configuration (env vars in milliseconds)
fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for IPC requests
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("AW_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for the daemon to exit after `stop`
pub fn timeout_exit() -> Duration {
    parse_duration_ms("AW_TIMEOUT_EXIT_MS").unwrap_or(Duration::from_secs(2))
}

fn poll_interval() -> Duration {
    parse_duration_ms("AW_POLL_INTERVAL_MS").unwrap_or(Duration::from_millis(50))
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Daemon not running")]
    DaemonNotRunning,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Unexpected response from daemon")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Daemon health as reported by `Status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonStatus {
    pub uptime_secs: u64,
    pub last_sequence: u64,
    pub checkpoint: u64,
    pub queue_depth: usize,
    pub counters: BTreeMap<String, u64>,
}

/// Daemon client
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Connect to an existing daemon
    ///
    /// Only checks for the socket; a stale socket surfaces as
    /// `DaemonNotRunning` on the first request.
    pub fn connect(socket_path: &Path) -> Result<Self, ClientError> {
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }
        Ok(Self {
            socket_path: socket_path.to_path_buf(),
        })
    }

    async fn send_with_timeout(
        &self,
        request: Request,
        timeout: Duration,
    ) -> Result<Response, ClientError> {
        let stream = match UnixStream::connect(&self.socket_path).await {
            Ok(stream) => stream,
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::ConnectionRefused | std::io::ErrorKind::NotFound
                ) =>
            {
                return Err(ClientError::DaemonNotRunning)
            }
            Err(e) => return Err(e.into()),
        };
        let (mut reader, mut writer) = stream.into_split();
        debug!(?request, "sending request");

        let data = protocol::encode(&request)?;
        tokio::time::timeout(timeout, protocol::write_message(&mut writer, &data))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        let response_bytes = tokio::time::timeout(timeout, protocol::read_message(&mut reader))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        Ok(protocol::decode(&response_bytes)?)
    }

    /// Send a request and receive a response
    pub async fn send(&self, request: Request) -> Result<Response, ClientError> {
        self.send_with_timeout(request, timeout_ipc()).await
    }

    /// Get daemon version via Hello handshake
    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello {
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        match self.send(request).await? {
            Response::Hello { version } => Ok(version),
            other => Err(Self::reject(other)),
        }
    }

    pub async fn status(&self) -> Result<DaemonStatus, ClientError> {
        match self.send(Request::Status).await? {
            Response::Status {
                uptime_secs,
                last_sequence,
                checkpoint,
                queue_depth,
                counters,
            } => Ok(DaemonStatus {
                uptime_secs,
                last_sequence,
                checkpoint,
                queue_depth,
                counters,
            }),
            other => Err(Self::reject(other)),
        }
    }

    /// Record one audit entry
    pub async fn log(&self, entry: AuditEntry) -> Result<(), ClientError> {
        match self.send(Request::Log { entry }).await? {
            Response::Logged => Ok(()),
            other => Err(Self::reject(other)),
        }
    }

    /// Request daemon shutdown
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(Request::Shutdown).await? {
            Response::ShuttingDown => Ok(()),
            other => Err(Self::reject(other)),
        }
    }

    /// Wait until the daemon has removed its socket
    pub async fn wait_for_exit(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if !self.socket_path.exists() {
                return true;
            }
            tokio::time::sleep(poll_interval()).await;
        }
        false
    }

    fn reject(response: Response) -> ClientError {
        match response {
            Response::Error { message } => ClientError::Rejected(message),
            _ => ClientError::UnexpectedResponse,
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
