//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use seatbook_core::error::{AppError, ErrorKind};

/// Seconds a client should wait before retrying after a lock timeout.
const RETRY_AFTER_SECONDS: &str = "1";

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// HTTP-facing wrapper around [`AppError`].
///
/// Handlers return `Result<_, ApiError>` and use `?` on service calls.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Configuration => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::ProfileMismatch => StatusCode::FORBIDDEN,
        ErrorKind::Conflict
        | ErrorKind::AlreadyBooked
        | ErrorKind::QuotaExhausted
        | ErrorKind::BookingClosed => StatusCode::CONFLICT,
        ErrorKind::TransientLockTimeout | ErrorKind::ServiceUnavailable => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ErrorKind::Database | ErrorKind::Cache | ErrorKind::Serialization | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(err.kind);
        if status.is_server_error() && !err.is_retryable() {
            tracing::error!(kind = %err.kind, error = %err.message, "Request failed");
        }

        let body = ApiErrorResponse {
            error: err.kind.code().to_string(),
            message: err.message.clone(),
        };

        let mut response = (status, Json(body)).into_response();
        if err.is_retryable() {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from_static(RETRY_AFTER_SECONDS),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_outcomes_map_to_conflict() {
        for kind in [
            ErrorKind::AlreadyBooked,
            ErrorKind::QuotaExhausted,
            ErrorKind::BookingClosed,
        ] {
            assert_eq!(status_for(kind), StatusCode::CONFLICT);
        }
        assert_eq!(status_for(ErrorKind::ProfileMismatch), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_lock_timeout_sets_retry_after() {
        let response = ApiError(AppError::lock_timeout("busy")).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER),
            Some(&HeaderValue::from_static("1"))
        );
    }

    #[test]
    fn test_not_found_has_no_retry_after() {
        let response = ApiError(AppError::not_found("missing")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }
}
