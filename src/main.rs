//! Main entry point for the analytics-traffic-simulator CLI

use analytics_traffic_simulator::cli::{Cli, Commands};
use analytics_traffic_simulator::stop::{self, StopController};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    // Check if JSON output is requested via environment variable
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("analytics_traffic_simulator=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Some(addr) = cli.metrics_addr {
        if let Err(e) = analytics_traffic_simulator::metrics::init_metrics(addr) {
            error!("Failed to initialize metrics: {}", e);
            std::process::exit(1);
        }
    }

    // Install global stop handle and Ctrl+C handler; a second Ctrl+C while
    // the pause is draining exits immediately.
    let stop_handle = StopController::shared();
    stop::set_global_stop(stop_handle.clone());
    tokio::spawn({
        let stop_handle = stop_handle.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Ctrl+C received - pausing run and saving progress...");
                stop_handle.request_stop();
            }
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Second Ctrl+C - exiting without waiting");
                std::process::exit(130);
            }
        }
    });

    let result = match cli.command {
        Commands::Run(ref args) => args
            .execute(&cli, stop_handle.clone())
            .await
            .map_err(|e| anyhow::anyhow!(e)),
        Commands::Checkpoints(ref checkpoints_cmd) => checkpoints_cmd
            .execute(&cli)
            .await
            .map_err(|e| anyhow::anyhow!(e)),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
