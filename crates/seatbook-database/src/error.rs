//! Mapping of PostgreSQL failures onto [`AppError`] kinds.

use seatbook_core::error::{AppError, ErrorKind};

/// `lock_not_available`, raised when `lock_timeout` expires.
const LOCK_NOT_AVAILABLE: &str = "55P03";
/// `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";
/// `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Unique constraint enforcing one booking per student per exam.
pub const BOOKING_UNIQUENESS: &str = "bookings_student_exam_key";

/// Convert a sqlx error into an [`AppError`], preserving the booking-relevant
/// SQLSTATEs as typed kinds.
pub fn map_sqlx(context: &str, err: sqlx::Error) -> AppError {
    if matches!(err, sqlx::Error::PoolTimedOut) {
        return AppError::with_source(
            ErrorKind::ServiceUnavailable,
            format!("{context}: connection pool exhausted"),
            err,
        );
    }

    let (code, constraint) = match &err {
        sqlx::Error::Database(db) => (
            db.code().map(|c| c.into_owned()),
            db.constraint().map(str::to_string),
        ),
        _ => (None, None),
    };

    match code.as_deref() {
        Some(LOCK_NOT_AVAILABLE) | Some(DEADLOCK_DETECTED) => AppError::with_source(
            ErrorKind::TransientLockTimeout,
            format!("{context}: lock not acquired in time"),
            err,
        ),
        Some(UNIQUE_VIOLATION) if constraint.as_deref() == Some(BOOKING_UNIQUENESS) => {
            AppError::with_source(
                ErrorKind::AlreadyBooked,
                "Student already holds a booking for this exam",
                err,
            )
        }
        Some(UNIQUE_VIOLATION) => AppError::with_source(
            ErrorKind::Conflict,
            format!("{context}: duplicate entry"),
            err,
        ),
        Some(FOREIGN_KEY_VIOLATION) => AppError::with_source(
            ErrorKind::NotFound,
            format!("{context}: referenced record does not exist"),
            err,
        ),
        _ => AppError::with_source(ErrorKind::Database, context.to_string(), err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_unavailable() {
        let err = map_sqlx("Failed to begin", sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
    }

    #[test]
    fn test_row_not_found_is_database_error() {
        let err = map_sqlx("Failed to load", sqlx::Error::RowNotFound);
        assert_eq!(err.kind, ErrorKind::Database);
        assert_eq!(err.message, "Failed to load");
    }
}
