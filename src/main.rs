//! Edge Echo Service
//!
//! A multi-region echo service for checking which instance serves a request.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                   EDGE ECHO                       │
//!                      │                                                   │
//!   Client Request     │  ┌─────────┐    ┌──────────┐    ┌─────────────┐  │
//!   ───────────────────┼─▶│  http   │───▶│ routing  │───▶│  409 +      │──┼──▶ edge router
//!                      │  │ server  │    │ (replay) │    │ fly-replay  │  │    re-dispatches
//!                      │  └─────────┘    └────┬─────┘    └─────────────┘  │
//!                      │                      │ local                      │
//!                      │             ┌────────┴─────────┐                  │
//!                      │             ▼                  ▼                  │
//!   Client Response    │     ┌──────────────┐   ┌────────────────┐        │
//!   ◀──────────────────┼─────│  metadata    │   │  websocket     │        │
//!                      │     │  (JSON body) │   │  echo session  │        │
//!                      │     └──────────────┘   └────────────────┘        │
//!                      │                                                   │
//!                      │  identity · config · lifecycle · observability   │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_echo::config::resolve_config;
use edge_echo::http::HttpServer;
use edge_echo::identity::InstanceIdentity;
use edge_echo::lifecycle::{signals, Shutdown};
use edge_echo::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "edge-echo")]
#[command(about = "Multi-region HTTP and websocket echo service", long_about = None)]
struct Cli {
    /// Optional TOML configuration file. `PORT` still overrides the port.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("edge-echo v{} starting", env!("CARGO_PKG_VERSION"));

    let identity = InstanceIdentity::from_env();
    tracing::info!(
        region = identity.region(),
        instance = identity.instance_id(),
        bind_address = %config.listener.bind_address,
        message_timeout_secs = config.session.message_timeout_secs,
        "Configuration loaded"
    );

    // A listener that cannot be bound is the only fatal error.
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config, identity, shutdown);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
