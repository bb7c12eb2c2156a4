// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! aw - audit WAL control CLI

mod client;
mod commands;
mod error;

use std::path::PathBuf;

use anyhow::Result;
use aw_daemon::Config;
use clap::{Parser, Subcommand};
use commands::{daemon, log, wal};

#[derive(Parser)]
#[command(name = "aw", version, about = "Audit WAL - durable audit logging")]
struct Cli {
    /// Daemon config file [default: <config dir>/aw/awd.toml]
    #[arg(long, global = true, env = "AW_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show daemon health and commit progress
    Status,
    /// Stop the daemon
    Stop,
    /// Record an audit entry through the daemon
    Log(log::LogArgs),
    /// Inspect a WAL folder directly
    #[command(subcommand)]
    Wal(wal::WalCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        // Offline; needs no daemon config
        Commands::Wal(command) => wal::handle(command, &mut stdout),
        Commands::Status => daemon::status(&load_config(cli.config)?, &mut stdout).await,
        Commands::Stop => daemon::stop(&load_config(cli.config)?, &mut stdout).await,
        Commands::Log(args) => log::handle(args, &load_config(cli.config)?, &mut stdout).await,
    }
}

fn load_config(explicit: Option<PathBuf>) -> Result<Config> {
    let path = match explicit {
        Some(path) => path,
        None => dirs::config_dir()
            .ok_or_else(|| {
                error::AwError::new("No config directory for this user")
                    .with_suggestion("Pass --config <file> or set AW_CONFIG")
            })?
            .join("aw")
            .join("awd.toml"),
    };
    tracing::debug!(path = %path.display(), "loading daemon config");
    Ok(Config::load(&path)?)
}

/// Diagnostics go to stderr and stay off unless RUST_LOG is set
fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    if let Ok(filter) = EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
