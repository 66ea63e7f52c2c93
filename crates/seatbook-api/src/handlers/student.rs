//! Student-facing booking handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::dto::{BookRequest, validate_body};
use crate::error::ApiError;
use crate::handlers::ok;
use crate::state::AppState;

/// GET /api/students/{roll_no}/available
pub async fn list_available(
    State(state): State<AppState>,
    Path(roll_no): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let slots = state.availability.list_available(&roll_no).await?;
    Ok(Json(ok(slots)))
}

/// GET /api/students/{roll_no}/available/exams
pub async fn list_available_exams(
    State(state): State<AppState>,
    Path(roll_no): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let exams = state.availability.list_available_exams(&roll_no).await?;
    Ok(Json(ok(exams)))
}

/// POST /api/students/{roll_no}/bookings
pub async fn book(
    State(state): State<AppState>,
    Path(roll_no): Path<String>,
    Json(req): Json<BookRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    validate_body(&req)?;
    let student = state.roster.get_student(&roll_no).await?;
    let target = req.into_target(&student)?;
    let booking = state.bookings.attempt_booking(&roll_no, &target).await?;
    Ok((StatusCode::CREATED, Json(ok(booking))))
}

/// GET /api/students/{roll_no}/bookings
pub async fn list_bookings(
    State(state): State<AppState>,
    Path(roll_no): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let bookings = state.bookings.bookings_for(&roll_no).await?;
    Ok(Json(ok(bookings)))
}
