//! Availability read model.

use chrono::NaiveDate;
use seatbook_core::types::{ExamId, QuotaId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::student::Category;

/// One bookable day for a department/category, as seen at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AvailableSlot {
    /// Slot ID to book with.
    pub quota_id: QuotaId,
    /// Exam the slot belongs to.
    pub exam_id: ExamId,
    /// Exam display name.
    pub exam_name: String,
    /// 0-based day within the exam window.
    pub day_index: i32,
    /// Calendar date.
    pub slot_date: NaiveDate,
    /// Category partition.
    pub category: Category,
    /// Seats left at read time.
    pub remaining: i32,
}
