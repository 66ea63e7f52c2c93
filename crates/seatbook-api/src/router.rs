//! Route definitions for the SeatBook HTTP API.
//!
//! All routes are mounted under `/api`. Student routes are addressed by
//! roll number; admin routes manage the roster and exam inventory.

use std::time::Duration;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::compression::build_compression_layer;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);
    let cors = build_cors_layer(&state.config.server.cors);

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(student_routes())
        .merge(admin_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(TimeoutLayer::new(timeout))
        .layer(build_compression_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Availability and booking for one student
fn student_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/students/{roll_no}/available",
            get(handlers::student::list_available),
        )
        .route(
            "/students/{roll_no}/available/exams",
            get(handlers::student::list_available_exams),
        )
        .route(
            "/students/{roll_no}/bookings",
            get(handlers::student::list_bookings).post(handlers::student::book),
        )
}

/// Roster, exam inventory, quota corrections, booking reports
fn admin_routes() -> Router<AppState> {
    use handlers::admin::{bookings, departments, exams, quotas, students};

    Router::new()
        .route(
            "/admin/departments",
            get(departments::list_departments).post(departments::create_department),
        )
        .route(
            "/admin/students",
            get(students::list_students).post(students::create_student),
        )
        .route("/admin/students/{roll_no}", get(students::get_student))
        .route(
            "/admin/exams",
            get(exams::list_exams).post(exams::create_exam),
        )
        .route(
            "/admin/exams/{id}",
            get(exams::get_exam).delete(exams::delete_exam),
        )
        .route("/admin/exams/{id}/status", put(exams::update_status))
        .route("/admin/exams/{id}/quotas", get(exams::list_quotas))
        .route("/admin/quotas/{id}/release", post(quotas::release))
        .route("/admin/bookings", get(bookings::list_bookings))
}
