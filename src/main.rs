//! Ledger tip relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                  TIP RELAY                   │
//!                      │                                              │
//!   Ledger gateway     │  ┌──────────┐   ┌─────────┐   ┌───────────┐  │
//!   ◀──────────────────┼──│  ledger  │◀──│payments │──▶│   relay   │──┼──▶ /ws viewers
//!   (GraphQL, REST)    │  │  reader  │   │ monitor │   │broadcaster│  │
//!                      │  └──────────┘   └─────────┘   └─────▲─────┘  │
//!                      │                                     │        │
//!   POST /notify ──────┼─────────────────▶ http server ───────┘        │
//!   GET  /health       │                                              │
//!                      │  config · observability · lifecycle          │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use tip_relay::config::{load_config, load_env_file};
use tip_relay::http::{AppState, HttpServer};
use tip_relay::ledger::LedgerReader;
use tip_relay::lifecycle::{listen_for_signals, Shutdown};
use tip_relay::observability::{logging, metrics};
use tip_relay::payments::{InMemoryDedupStore, PaymentMonitor};

#[derive(Parser)]
#[command(name = "tip-relay")]
#[command(about = "Relays incoming ledger tips to WebSocket viewers", long_about = None)]
struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "TIP_RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let env_file = load_env_file();

    // Fatal before any network activity, including a missing WALLET_ADDRESS.
    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.observability);
    if let Some(path) = env_file {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }
    tracing::info!("tip-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        gateway = %config.ledger.gateway_url,
        address = %config.ledger.watched_address,
        interval_secs = config.poll.interval_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let ledger = Arc::new(LedgerReader::new(&config.ledger)?);
    let state = AppState::new(&config, Arc::new(InMemoryDedupStore::new()));

    let monitor = PaymentMonitor::new(
        &config,
        ledger,
        Arc::clone(&state.dedup),
        Arc::clone(&state.broadcaster),
        Arc::clone(&state.poll_status),
    );
    let monitor_task = tokio::spawn(monitor.run(shutdown.subscribe()));
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(listen_for_signals(shutdown.clone()));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(&config, state);
    server.run(listener, server_shutdown).await?;

    if let Err(e) = monitor_task.await {
        tracing::error!(error = %e, "Payment monitor task failed");
    }
    tracing::info!("Shutdown complete");
    Ok(())
}
