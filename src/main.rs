//! SeatBook server: exam seat quota allocation and booking.
//!
//! Main entry point that loads configuration, wires the crates together and
//! serves the HTTP API until a shutdown signal arrives.

use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use seatbook_core::config::AppConfig;
use seatbook_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(kind = %e.kind, "Server error: {}", e.message);
        std::process::exit(1);
    }
}

/// Load configuration from file, the environment overlay and `SEATBOOK__*`
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("SEATBOOK_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let env = std::env::var("SEATBOOK_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load_from(&config_path, &format!("config/{env}"))
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        backend = %config.booking.backend,
        "Starting SeatBook v{}",
        env!("CARGO_PKG_VERSION")
    );

    // ── Step 1: Infrastructure and services ──────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = seatbook_api::build_state(config).await?;
    let db = state.db.clone();

    // ── Step 2: Router ───────────────────────────────────────────
    let app = seatbook_api::build_app(state);

    // ── Step 3: Bind ─────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!("SeatBook server listening on {}", addr);

    // ── Step 4: Serve until shutdown ─────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, draining in-flight requests...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 5: Release connections ──────────────────────────────
    if let Some(db) = db {
        if tokio::time::timeout(grace, db.close()).await.is_err() {
            tracing::warn!("Database pool did not close within the grace period");
        }
    }

    tracing::info!("SeatBook server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
