use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use volt_api::{create_app, AppState};
use volt_store::memory::NewStation;

/// Command line arguments for the voltspot server
#[derive(Parser, Debug)]
#[command(name = "voltspot")]
#[command(about = "VoltSpot charging station locator and booking API")]
struct Args {
    /// Optional JSON file of stations to load at startup
    #[arg(short, long)]
    seed: Option<PathBuf>,

    /// Port to bind the server to
    #[arg(short, long, default_value = "3000")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt().pretty().init();

    let state = AppState::new();

    if let Some(path) = &args.seed {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read seed file '{}'", path.display()))?;
        let stations: Vec<NewStation> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse seed file '{}'", path.display()))?;
        let count = stations.len();
        for station in stations {
            state
                .store
                .create_station(station)
                .map_err(|err| anyhow::anyhow!("failed to seed station: {err}"))?;
        }
        tracing::info!("seeded {} stations from {}", count, path.display());
    }

    let app = create_app(state);

    let bind_addr = format!("0.0.0.0:{}", args.port);
    tracing::info!("starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
