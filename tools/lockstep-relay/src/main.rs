//! Lockstep Relay Server
//!
//! A standalone relay that accepts WebSocket connections and rebroadcasts
//! messages between connected clients.

use anyhow::{Context, Result};
use clap::Parser;
use lockstep_relay::{Relay, RelayConfig};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lockstep-relay")]
#[command(about = "Lockstep Relay Server")]
#[command(version)]
struct Cli {
    /// Listen address (default 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Server name
    #[arg(short, long)]
    name: Option<String>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// TOML config file values; CLI flags take precedence
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    listen: Option<SocketAddr>,
    name: Option<String>,
    max_message_size: Option<usize>,
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let file = match &cli.config {
        Some(path) => load_file_config(path)?,
        None => FileConfig::default(),
    };

    let listen = cli.listen.or(file.listen).unwrap_or_else(|| {
        SocketAddr::from(([0, 0, 0, 0], lockstep_core::DEFAULT_WS_PORT))
    });

    let defaults = RelayConfig::default();
    let config = RelayConfig {
        name: cli.name.or(file.name).unwrap_or(defaults.name),
        max_message_size: file.max_message_size.unwrap_or(defaults.max_message_size),
    };

    tracing::info!("Starting {}", config.name);

    let relay = Relay::new(config);

    tracing::info!("Relay ready on ws://{}", listen);

    // Run until interrupted
    relay.serve(&listen.to_string()).await?;

    Ok(())
}
