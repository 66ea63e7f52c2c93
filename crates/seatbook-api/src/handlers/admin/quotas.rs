//! Admin quota corrections.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use seatbook_core::types::QuotaId;
use seatbook_service::QuotaRow;

use crate::error::ApiError;
use crate::handlers::ok;
use crate::state::AppState;

/// POST /api/admin/quotas/{id}/release
///
/// Returns one seat to the slot. Existing bookings are not touched.
pub async fn release(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let counter = state.exams.release_seat(QuotaId::from_uuid(id)).await?;
    Ok(Json(ok(QuotaRow::from(&counter))))
}
