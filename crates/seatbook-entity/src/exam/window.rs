//! Exam window entity.

use chrono::{DateTime, Days, NaiveDate, Utc};
use seatbook_core::types::ExamId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ExamStatus;

/// A contiguous run of exam days. Day `i` (0-based) falls on
/// `start_date + i` days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ExamWindow {
    /// Exam ID.
    pub id: ExamId,
    /// Display name.
    pub name: String,
    /// First exam day.
    pub start_date: NaiveDate,
    /// Number of exam days.
    pub day_count: i32,
    /// Lifecycle status.
    pub status: ExamStatus,
    /// When the exam was created.
    pub created_at: DateTime<Utc>,
}

impl ExamWindow {
    /// Build a new exam in the `Generating` state.
    pub fn new(name: impl Into<String>, start_date: NaiveDate, day_count: i32) -> Self {
        Self {
            id: ExamId::new(),
            name: name.into(),
            start_date,
            day_count,
            status: ExamStatus::Generating,
            created_at: Utc::now(),
        }
    }

    /// Date of day `index`, or `None` when out of range.
    pub fn day_date(&self, index: i32) -> Option<NaiveDate> {
        if index < 0 || index >= self.day_count {
            return None;
        }
        self.start_date.checked_add_days(Days::new(index as u64))
    }

    /// Last exam day. `None` for a window with no days.
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.day_date(self.day_count - 1)
    }

    /// Day index of `date`, or `None` when it falls outside the window.
    pub fn day_index_of(&self, date: NaiveDate) -> Option<i32> {
        let offset = (date - self.start_date).num_days();
        if offset < 0 || offset >= i64::from(self.day_count) {
            return None;
        }
        i32::try_from(offset).ok()
    }

    /// Whether bookings are accepted.
    pub fn is_open(&self) -> bool {
        self.status.accepts_bookings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> ExamWindow {
        let start = NaiveDate::from_ymd_opt(2026, 11, 2).expect("valid date");
        ExamWindow::new("Midterm", start, 3)
    }

    #[test]
    fn test_day_dates() {
        let exam = window();
        assert_eq!(exam.day_date(0), NaiveDate::from_ymd_opt(2026, 11, 2));
        assert_eq!(exam.day_date(2), NaiveDate::from_ymd_opt(2026, 11, 4));
        assert_eq!(exam.day_date(3), None);
        assert_eq!(exam.day_date(-1), None);
        assert_eq!(exam.end_date(), NaiveDate::from_ymd_opt(2026, 11, 4));
    }

    #[test]
    fn test_day_index_of() {
        let exam = window();
        let third = NaiveDate::from_ymd_opt(2026, 11, 4).expect("valid date");
        let after = NaiveDate::from_ymd_opt(2026, 11, 5).expect("valid date");
        let before = NaiveDate::from_ymd_opt(2026, 11, 1).expect("valid date");
        assert_eq!(exam.day_index_of(third), Some(2));
        assert_eq!(exam.day_index_of(after), None);
        assert_eq!(exam.day_index_of(before), None);
    }

    #[test]
    fn test_new_exam_is_generating() {
        assert!(!window().is_open());
    }
}
