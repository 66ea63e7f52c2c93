//! Exam lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an exam window.
///
/// An exam is `Generating` only inside the transaction that installs its
/// quota rows; callers observe `Open` or `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "exam_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExamStatus {
    /// Quota rows are being materialized.
    Generating,
    /// Students may book.
    Open,
    /// Booking window closed.
    Closed,
}

impl ExamStatus {
    /// Return the status as its stored string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generating => "GENERATING",
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }

    /// Whether bookings are accepted.
    pub fn accepts_bookings(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for ExamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExamStatus {
    type Err = seatbook_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GENERATING" => Ok(Self::Generating),
            "OPEN" => Ok(Self::Open),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(seatbook_core::AppError::validation(format!(
                "Invalid exam status: '{s}'. Expected one of: OPEN, CLOSED"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_open_accepts_bookings() {
        assert!(ExamStatus::Open.accepts_bookings());
        assert!(!ExamStatus::Generating.accepts_bookings());
        assert!(!ExamStatus::Closed.accepts_bookings());
    }

    #[test]
    fn test_parse() {
        assert_eq!("open".parse::<ExamStatus>().ok(), Some(ExamStatus::Open));
        assert!("paused".parse::<ExamStatus>().is_err());
    }
}
