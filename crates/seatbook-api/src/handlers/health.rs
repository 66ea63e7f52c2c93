//! Health check handler.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use seatbook_core::traits::cache::CacheProvider;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let store = state.store.health_check().await.unwrap_or_else(|e| {
        warn!(error = %e, "Store health check failed");
        false
    });
    let cache = match &state.cache {
        Some(cache) => Some(cache.health_check().await.unwrap_or_else(|e| {
            warn!(error = %e, "Cache health check failed");
            false
        })),
        None => None,
    };

    let healthy = store && cache.unwrap_or(true);
    Json(ApiResponse::ok(HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.store.backend().to_string(),
        store,
        cache,
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}
