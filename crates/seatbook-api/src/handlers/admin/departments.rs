//! Admin department handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::{CreateDepartmentRequest, validate_body};
use crate::error::ApiError;
use crate::handlers::ok;
use crate::state::AppState;

/// GET /api/admin/departments
pub async fn list_departments(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let departments = state.roster.list_departments().await?;
    Ok(Json(ok(departments)))
}

/// POST /api/admin/departments
pub async fn create_department(
    State(state): State<AppState>,
    Json(req): Json<CreateDepartmentRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    validate_body(&req)?;
    let department = state.roster.create_department(&req.code, &req.name).await?;
    Ok((StatusCode::CREATED, Json(ok(department))))
}
