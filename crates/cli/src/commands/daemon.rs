// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `aw status` and `aw stop`

use std::io::Write;

use anyhow::Result;
use aw_daemon::Config;

use crate::client::{timeout_exit, ClientError, DaemonClient, DaemonStatus};

pub async fn status(config: &Config, out: &mut impl Write) -> Result<()> {
    let status = match DaemonClient::connect(&config.socket_path) {
        Ok(client) => query(&client).await,
        Err(e) => Err(e),
    };
    match status {
        Ok((version, status)) => write_status(out, &version, &status)?,
        Err(ClientError::DaemonNotRunning) => writeln!(out, "Daemon not running")?,
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub async fn stop(config: &Config, out: &mut impl Write) -> Result<()> {
    let client = match DaemonClient::connect(&config.socket_path) {
        Ok(client) => client,
        Err(ClientError::DaemonNotRunning) => {
            writeln!(out, "Daemon not running")?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    match client.shutdown().await {
        Ok(()) => {}
        Err(ClientError::DaemonNotRunning) => {
            writeln!(out, "Daemon not running")?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    let timeout = timeout_exit();
    if client.wait_for_exit(timeout).await {
        writeln!(out, "Daemon stopped")?;
        Ok(())
    } else {
        anyhow::bail!(
            "Daemon did not exit within {}",
            format_duration(timeout.as_secs())
        )
    }
}

async fn query(client: &DaemonClient) -> Result<(String, DaemonStatus), ClientError> {
    let version = client.hello().await?;
    let status = client.status().await?;
    Ok((version, status))
}

pub(crate) fn write_status(
    out: &mut impl Write,
    version: &str,
    status: &DaemonStatus,
) -> std::io::Result<()> {
    writeln!(out, "Status: running")?;
    writeln!(out, "Version: {}", version)?;
    writeln!(out, "Uptime: {}", format_duration(status.uptime_secs))?;
    writeln!(out, "Last sequence: {}", status.last_sequence)?;
    writeln!(
        out,
        "Checkpoint: {} ({} behind)",
        status.checkpoint,
        status.last_sequence.saturating_sub(status.checkpoint)
    )?;
    writeln!(out, "Queue depth: {}", status.queue_depth)?;
    if !status.counters.is_empty() {
        writeln!(out, "Counters:")?;
        for (name, value) in &status.counters {
            writeln!(out, "  {}: {}", name, value)?;
        }
    }
    Ok(())
}

pub(crate) fn format_duration(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    match (h, m) {
        (0, 0) => format!("{}s", s),
        (0, _) => format!("{}m {}s", m, s),
        _ => format!("{}h {}m {}s", h, m, s),
    }
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
