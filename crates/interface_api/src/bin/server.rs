//! Disability Rating API Server Binary
//!
//! Loads the reference tables and serves the rating API.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin rating-api
//!
//! # Run with environment variables
//! API_PORT=9090 API_TABLES_DIR=/srv/tables API_WEEKLY_RATE=290.00 cargo run --bin rating-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_TABLES_DIR` - Directory of the reference table CSV files (default: data)
//! * `API_SPLIT_GROUP` - First group of the high variant table (default: 310)
//! * `API_WEEKLY_RATE` - Weekly benefit rate (default: 290.00)
//! * `API_CURRENCY` - Currency code (default: USD)
//! * `API_PAIN_ADD_ON_CAP` - Maximum pain add-on (default: 3)
//! * `API_EARNING_CAPACITY_FACTOR` - Base rating multiplier (default: 1)
//! * `API_BUCKET_STRATEGY` - `nearest` or `floor` (default: nearest)
//! * `API_COMBINED_PRECISION` - Decimal places of the combined rating (default: 0)
//! * `API_DEFAULT_GROUP` - Group for unmatched occupations (default: unset)
//! * `API_FUZZY_OCCUPATION_MATCHING` - Substring title matching (default: true)
//! * `API_MEDICAL_INFLATION_RATE` - Yearly growth of projected medical costs (default: 0.03)

use anyhow::Context;
use interface_api::{config::ApiConfig, create_router, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API_* configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        tables_dir = %config.tables_dir.display(),
        "Starting rating API server"
    );

    let state = AppState::load(config.clone()).with_context(|| {
        format!(
            "failed to load reference tables from {}",
            config.tables_dir.display()
        )
    })?;

    let app = create_router(state);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
