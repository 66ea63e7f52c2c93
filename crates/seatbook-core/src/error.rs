//! Unified application error types for SeatBook.
//!
//! Every crate maps its internal failures into [`AppError`] so that the
//! booking outcomes (`ProfileMismatch`, `AlreadyBooked`, `QuotaExhausted`,
//! ...) travel to the caller as typed results rather than strings.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate reference data, illegal state change).
    Conflict,
    /// An allocation request is malformed (zero days, negative demand, ...).
    Configuration,
    /// The requested quota does not belong to the student's department/category.
    ProfileMismatch,
    /// The student already holds a booking in this exam window.
    AlreadyBooked,
    /// The quota has no remaining capacity.
    QuotaExhausted,
    /// The quota lock could not be acquired in time. Safe to retry.
    TransientLockTimeout,
    /// The exam is not open for booking.
    BookingClosed,
    /// A database error occurred.
    Database,
    /// A cache error occurred.
    Cache,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
    /// The service is temporarily unavailable.
    ServiceUnavailable,
}

impl ErrorKind {
    /// Machine-readable code used in API responses and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION",
            Self::Conflict => "CONFLICT",
            Self::Configuration => "CONFIGURATION",
            Self::ProfileMismatch => "PROFILE_MISMATCH",
            Self::AlreadyBooked => "ALREADY_BOOKED",
            Self::QuotaExhausted => "QUOTA_EXHAUSTED",
            Self::TransientLockTimeout => "TRANSIENT_LOCK_TIMEOUT",
            Self::BookingClosed => "BOOKING_CLOSED",
            Self::Database => "DATABASE",
            Self::Cache => "CACHE",
            Self::Serialization => "SERIALIZATION",
            Self::Internal => "INTERNAL",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The unified application error used throughout SeatBook.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a profile-mismatch error.
    pub fn profile_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ProfileMismatch, message)
    }

    /// Create an already-booked error.
    pub fn already_booked(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyBooked, message)
    }

    /// Create a quota-exhausted error.
    pub fn quota_exhausted(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::QuotaExhausted, message)
    }

    /// Create a lock-timeout error.
    pub fn lock_timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransientLockTimeout, message)
    }

    /// Create a booking-closed error.
    pub fn booking_closed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BookingClosed, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// Whether an identical request may be retried.
    ///
    /// Only a lock timeout qualifies: the unit rolled back, so a retry either
    /// books or resolves to `AlreadyBooked`.
    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::TransientLockTimeout
    }

    /// Whether this error is a terminal business outcome of a booking attempt.
    pub fn is_booking_outcome(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ProfileMismatch
                | ErrorKind::AlreadyBooked
                | ErrorKind::QuotaExhausted
                | ErrorKind::BookingClosed
        )
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = AppError::quota_exhausted("no seats left");
        assert_eq!(err.to_string(), "QUOTA_EXHAUSTED: no seats left");
    }

    #[test]
    fn test_only_lock_timeout_is_retryable() {
        assert!(AppError::lock_timeout("busy").is_retryable());
        assert!(!AppError::already_booked("dup").is_retryable());
        assert!(!AppError::database("down").is_retryable());
    }

    #[test]
    fn test_booking_outcomes() {
        assert!(AppError::profile_mismatch("x").is_booking_outcome());
        assert!(AppError::booking_closed("x").is_booking_outcome());
        assert!(!AppError::not_found("x").is_booking_outcome());
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::other("disk");
        let err = AppError::with_source(ErrorKind::Internal, "wrapped", io);
        let cloned = err.clone();
        assert!(cloned.source.is_none());
        assert_eq!(cloned.kind, ErrorKind::Internal);
    }
}
