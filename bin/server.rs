// Car Offer - Web Server
// Quotes, stored valuations and pickup scheduling over HTTP

use anyhow::{Context, Result};
use car_offer::api::{self, AppState};
use car_offer::{load_config, seed_sample_valuations, setup_database, verify_count};
use clap::Parser;
use rusqlite::Connection;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "offer-server")]
#[command(version, about = "HTTP API for instant vehicle offers")]
struct Args {
    /// Path to the TOML settings file
    #[arg(short, long, env = "CAR_OFFER_CONFIG", default_value = car_offer::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_config(&args.config)?;

    car_offer::init_tracing(&settings.logging.level);
    info!(version = car_offer::VERSION, "Starting offer server");

    // Open database
    let conn = Connection::open(&settings.database.path)
        .with_context(|| format!("Failed to open database at {}", settings.database.path))?;
    setup_database(&conn)?;

    if settings.database.seed_on_startup {
        let seeded = seed_sample_valuations(&conn)?;
        if seeded > 0 {
            info!(seeded, "Seeded sample valuations");
        }
    }

    let count = verify_count(&conn)?;
    info!(path = %settings.database.path, valuations = count, "Database ready");

    let app = api::router(AppState::new(conn));

    // Start server
    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
