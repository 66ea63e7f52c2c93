//! Admin booking listing.

use axum::Json;
use axum::extract::{Query, State};

use crate::dto::BookingQuery;
use crate::error::ApiError;
use crate::handlers::ok;
use crate::state::AppState;

/// GET /api/admin/bookings?exam_id=&slot_id=&department_id=
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let bookings = state.exams.list_bookings(&query.into_filter()).await?;
    Ok(Json(ok(bookings)))
}
