//! Application builder: wires infrastructure, services and router.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tracing::info;

use seatbook_cache::CacheManager;
use seatbook_core::config::{AppConfig, StoreBackend};
use seatbook_core::error::AppError;
use seatbook_database::store::build_store;
use seatbook_database::{BookingStore, DatabasePool};

use crate::router::build_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Connect infrastructure for `config` and build the shared state.
///
/// The database is only touched for the postgres backend; migrations run
/// when `database.run_migrations` is set.
pub async fn build_state(config: AppConfig) -> Result<AppState, AppError> {
    // ── Step 1: Database ─────────────────────────────────────────
    let db = match config.booking.backend {
        StoreBackend::Postgres => {
            let db = DatabasePool::connect(&config.database).await?;
            if config.database.run_migrations {
                info!("Running database migrations...");
                seatbook_database::migration::run_migrations(db.pool()).await?;
            }
            Some(db)
        }
        StoreBackend::Memory => None,
    };

    // ── Step 2: Booking store ────────────────────────────────────
    let store: Arc<dyn BookingStore> =
        build_store(&config.booking, db.as_ref().map(|d| d.pool().clone()))?;
    info!(
        backend = %store.backend(),
        lock_timeout_ms = config.booking.lock_timeout_ms,
        "Booking store ready"
    );

    // ── Step 3: Cache ────────────────────────────────────────────
    let cache = if config.booking.availability_ttl() > Duration::ZERO {
        info!(provider = %config.cache.provider, "Initializing cache");
        Some(CacheManager::new(&config.cache).await?)
    } else {
        info!("Availability caching disabled");
        None
    };

    Ok(AppState::new(config, db, store, cache))
}
