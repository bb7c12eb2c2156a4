// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-socket request handling

use thiserror::Error;
use tokio::net::UnixStream;
use tracing::{debug, warn};

use crate::lifecycle::DaemonState;
use crate::protocol::{self, ProtocolError, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("client sent no request within {0:?}")]
    Timeout(std::time::Duration),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Serve one request/response exchange on `stream`.
///
/// A client that hangs up before sending anything is not an error.
pub async fn handle_connection(
    daemon: &mut DaemonState,
    stream: UnixStream,
) -> Result<(), ServerError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(request) => request,
        Err(ProtocolError::ConnectionClosed) => {
            debug!("client hung up without a request");
            return Ok(());
        }
        Err(ProtocolError::Timeout) => return Err(ServerError::Timeout(DEFAULT_TIMEOUT)),
        Err(e) => return Err(e.into()),
    };

    let kind = request_kind(&request);
    let response = handle_request(daemon, request).await;
    debug!(request = kind, ?response, "control request served");

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;
    Ok(())
}

/// Map a request onto the daemon and build its reply
pub async fn handle_request(daemon: &mut DaemonState, request: Request) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, daemon = PROTOCOL_VERSION, "client version differs");
            }
            Response::Hello {
                version: PROTOCOL_VERSION.to_string(),
            }
        }

        Request::Log { entry } => {
            daemon.pipeline.log(entry);
            Response::Logged
        }

        Request::Status => match daemon.checkpoint().await {
            Ok(checkpoint) => Response::Status {
                uptime_secs: daemon.start_time.elapsed().as_secs(),
                last_sequence: daemon.last_sequence(),
                checkpoint,
                queue_depth: daemon.pipeline.queue_depth(),
                counters: daemon.metrics.snapshot(),
            },
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        },

        Request::Shutdown => {
            daemon.shutdown_requested = true;
            Response::ShuttingDown
        }
    }
}

fn request_kind(request: &Request) -> &'static str {
    match request {
        Request::Ping => "ping",
        Request::Hello { .. } => "hello",
        Request::Log { .. } => "log",
        Request::Status => "status",
        Request::Shutdown => "shutdown",
    }
}
