//! Admin student handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use seatbook_entity::Category;
use seatbook_service::NewStudent;

use crate::dto::{CreateStudentRequest, StudentQuery, validate_body};
use crate::error::ApiError;
use crate::handlers::ok;
use crate::state::AppState;

/// GET /api/admin/students
pub async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<StudentQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let students = state
        .roster
        .list_students(query.department.as_deref())
        .await?;
    Ok(Json(ok(students)))
}

/// POST /api/admin/students
pub async fn create_student(
    State(state): State<AppState>,
    Json(req): Json<CreateStudentRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    validate_body(&req)?;
    let category: Category = req.category.parse()?;
    let student = state
        .roster
        .register_student(NewStudent {
            roll_no: req.roll_no,
            name: req.name,
            email: req.email,
            department_code: req.department_code,
            category,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ok(student))))
}

/// GET /api/admin/students/{roll_no}
pub async fn get_student(
    State(state): State<AppState>,
    Path(roll_no): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let student = state.roster.get_student(&roll_no).await?;
    Ok(Json(ok(student)))
}
