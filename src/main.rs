//! Annuaire - member/project/skill directory API

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use annuaire::{config::Args, db::MongoClient, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("annuaire={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  Annuaire - directory API");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    match args.database_config() {
        Some((_, db)) => info!("MongoDB database: {}", db),
        None => info!("MongoDB: not configured"),
    }
    info!("======================================");

    // Connect to MongoDB. A missing configuration or failed connection is
    // not fatal: the service starts and data endpoints report the condition
    // in the response body.
    let mongo = match args.database_config() {
        Some((uri, db)) => match MongoClient::new(uri, db, args.request_timeout_ms).await {
            Ok(client) => {
                info!("MongoDB connected successfully");
                Some(client)
            }
            Err(e) => {
                warn!("MongoDB connection failed (continuing, reported per request): {}", e);
                None
            }
        },
        None => {
            warn!("MONGODB_URI/MONGODB_DB not set - data endpoints will report DB_UNAVAILABLE");
            None
        }
    };

    let state = Arc::new(server::AppState::new(args, mongo));
    server::run(state).await?;

    Ok(())
}
