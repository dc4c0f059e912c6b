//! Burrow - configurable HTTP reverse proxy
//!
//! Registers tunnels mapping a subdomain or a path prefix to an upstream
//! URL, then transparently forwards matching requests.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use burrow_api::{serve, AppState};
use burrow_proxy::Forwarder;
use burrow_store::{JsonFileStore, TunnelStore};

/// Burrow - reverse proxy for subdomain and path tunnels
#[derive(Parser, Debug)]
#[command(name = "burrow")]
#[command(about = "Burrow - reverse proxy for subdomain and path tunnels")]
#[command(version)]
struct Cli {
    /// Address to bind the proxy and the management API
    #[arg(long, env = "BURROW_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Path to the tunnels JSON file
    #[arg(long, env = "BURROW_TUNNELS_FILE", default_value = "tunnels.json")]
    tunnels_file: PathBuf,

    /// Seconds the routing snapshot may lag behind the store
    #[arg(long, env = "BURROW_REFRESH_SECS", default_value = "10")]
    refresh_secs: u64,

    /// Upstream request timeout in seconds
    #[arg(long, env = "BURROW_UPSTREAM_TIMEOUT_SECS", default_value = "30")]
    upstream_timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    info!(
        tunnels_file = %cli.tunnels_file.display(),
        refresh_secs = cli.refresh_secs,
        "starting burrow"
    );

    let store: Arc<dyn TunnelStore> = Arc::new(JsonFileStore::new(&cli.tunnels_file));
    let forwarder = Forwarder::new(Duration::from_secs(cli.upstream_timeout_secs))
        .context("failed to build upstream client")?;
    let state = Arc::new(AppState::new(
        store,
        forwarder,
        Duration::from_secs(cli.refresh_secs),
    ));

    serve(cli.bind, state).await
}
