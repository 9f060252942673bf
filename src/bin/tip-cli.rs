use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use tip_relay::config::{load_env_file, read_config};
use tip_relay::observability::logging;
use tip_relay::viewer::{
    ClientRelay, CoinGeckoPrice, NotificationPresenter, PresenterTimings, RateCache,
    TerminalBell, TerminalSurface,
};

#[derive(Parser)]
#[command(name = "tip-cli")]
#[command(about = "Operator and viewer CLI for the tip relay", long_about = None)]
struct Cli {
    /// Relay HTTP base URL.
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Optional TOML configuration file (viewer settings).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show relay health
    Health,
    /// Send a manual tip to every viewer
    Notify {
        #[arg(long)]
        from: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        tx_id: Option<String>,
    },
    /// Connect as a viewer and print tips as they arrive
    Watch {
        /// WebSocket base URL; defaults to the configured server URL.
        #[arg(long)]
        server: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Notify { from, amount, tx_id } => {
            let res = client
                .post(format!("{}/notify", cli.url))
                .json(&json!({ "from": from, "amount": amount, "txId": tx_id }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Watch { server } => {
            let env_file = load_env_file();
            let config = read_config(cli.config.as_deref())?;
            logging::init_logging(&config.observability);
            if let Some(path) = env_file {
                tracing::debug!(path = %path.display(), "Loaded .env file");
            }
            let viewer = config.viewer;

            let price = CoinGeckoPrice::new(&viewer.price_url, &viewer.price_asset, Duration::from_secs(10))?;
            let presenter = NotificationPresenter::new(
                Arc::new(TerminalSurface),
                Arc::new(RateCache::new(Arc::new(price))),
                Arc::new(TerminalBell::new(&viewer.sound_url)),
                PresenterTimings::from_config(&viewer),
            );
            let server = server.unwrap_or(viewer.server_url);
            let relay = ClientRelay::new(&server, presenter, Duration::from_secs(viewer.error_secs));

            tokio::select! {
                result = relay.run() => {
                    if let Err(e) = result {
                        eprintln!("Error: {e}");
                    }
                }
                _ = tokio::signal::ctrl_c() => {}
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
