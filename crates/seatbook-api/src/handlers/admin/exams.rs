//! Admin exam handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use seatbook_core::error::AppError;
use seatbook_core::types::ExamId;
use seatbook_entity::{Category, DemandSpec, ExamStatus};
use seatbook_service::NewExam;

use crate::dto::{CreateExamRequest, UpdateExamStatusRequest, validate_body};
use crate::error::ApiError;
use crate::handlers::ok;
use crate::state::AppState;

/// GET /api/admin/exams
pub async fn list_exams(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let exams = state.exams.list_exams().await?;
    Ok(Json(ok(exams)))
}

/// POST /api/admin/exams
///
/// Plans and installs the whole quota inventory; responds with the summary.
pub async fn create_exam(
    State(state): State<AppState>,
    Json(req): Json<CreateExamRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    validate_body(&req)?;

    let mut demands = Vec::with_capacity(req.demands.len());
    for demand in &req.demands {
        let department = state.roster.department_by_code(&demand.department_code).await?;
        let category: Category = demand.category.parse()?;
        demands.push(DemandSpec::new(department.id, category, demand.total));
    }

    let summary = state
        .exams
        .initialize_exam(NewExam {
            name: req.name,
            start_date: req.start_date,
            day_count: req.day_count,
            demands,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ok(summary))))
}

/// GET /api/admin/exams/{id}
pub async fn get_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let exam = state.exams.get_exam(ExamId::from_uuid(id)).await?;
    Ok(Json(ok(exam)))
}

/// DELETE /api/admin/exams/{id}
pub async fn delete_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = state.exams.delete_exam(ExamId::from_uuid(id)).await?;
    Ok(Json(ok(report)))
}

/// PUT /api/admin/exams/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateExamStatusRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let open = match req.status.parse::<ExamStatus>()? {
        ExamStatus::Open => true,
        ExamStatus::Closed => false,
        ExamStatus::Generating => {
            return Err(AppError::validation("Status must be OPEN or CLOSED").into());
        }
    };
    let exam = state
        .exams
        .set_booking_open(ExamId::from_uuid(id), open)
        .await?;
    Ok(Json(ok(exam)))
}

/// GET /api/admin/exams/{id}/quotas
pub async fn list_quotas(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let rows = state.exams.list_quotas(ExamId::from_uuid(id)).await?;
    Ok(Json(ok(rows)))
}
