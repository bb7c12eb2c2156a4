// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `aw log`: hand one audit entry to the daemon

use std::io::Write;

use anyhow::Result;
use aw_core::AuditEntry;
use aw_daemon::Config;

use crate::client::{ClientError, DaemonClient};
use crate::error::AwError;

#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Project the resource belongs to
    #[arg(long)]
    pub project: String,

    /// Kind of resource touched, e.g. SECRET
    #[arg(long)]
    pub resource_type: String,

    #[arg(long)]
    pub resource_name: String,

    /// What happened, e.g. READ_SECRET
    #[arg(long)]
    pub action: String,

    #[arg(long)]
    pub user: String,

    #[arg(long)]
    pub resource_version: Option<u32>,

    /// Acting principal when different from the user
    #[arg(long)]
    pub actor: Option<String>,

    /// Client address as HEADER=VALUE (repeatable)
    #[arg(long = "ip", value_parser = parse_key_value)]
    pub ips: Vec<(String, String)>,

    /// Free-form KEY=VALUE (repeatable)
    #[arg(long = "meta", value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,
}

impl LogArgs {
    pub fn into_entry(self) -> AuditEntry {
        let mut entry = AuditEntry::new(
            self.project,
            self.resource_type,
            self.resource_name,
            self.action,
            self.user,
        );
        if let Some(version) = self.resource_version {
            entry = entry.with_version(version);
        }
        if let Some(actor) = self.actor {
            entry = entry.with_actor(actor);
        }
        for (header, value) in self.ips {
            entry = entry.with_ip(header, value);
        }
        for (key, value) in self.metadata {
            entry = entry.with_metadata(key, value);
        }
        entry
    }
}

pub async fn handle(args: LogArgs, config: &Config, out: &mut impl Write) -> Result<()> {
    let not_running = || AwError::daemon_not_running(&config.socket_path);

    let client = match DaemonClient::connect(&config.socket_path) {
        Ok(client) => client,
        Err(ClientError::DaemonNotRunning) => return Err(not_running().into()),
        Err(e) => return Err(e.into()),
    };
    match client.log(args.into_entry()).await {
        Ok(()) => {}
        Err(ClientError::DaemonNotRunning) => return Err(not_running().into()),
        Err(e) => return Err(e.into()),
    }

    writeln!(out, "Logged")?;
    Ok(())
}

pub(crate) fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
