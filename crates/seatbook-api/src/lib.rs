//! # seatbook-api
//!
//! HTTP API layer for SeatBook built on Axum.
//!
//! Provides the student booking endpoints, the admin endpoints for exams,
//! quotas and the roster, middleware (CORS, compression, timeouts, request
//! logging), DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state};
pub use error::ApiError;
pub use state::AppState;
