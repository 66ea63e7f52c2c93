//! Booking entity.

use chrono::{DateTime, NaiveDate, Utc};
use seatbook_core::types::{BookingId, DepartmentId, ExamId, QuotaId, StudentId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::quota::QuotaCounter;
use crate::student::Category;

/// A committed seat booking. Never updated; removed only when its exam is
/// torn down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Booking {
    /// Booking ID.
    pub id: BookingId,
    /// Student holding the seat.
    pub student_id: StudentId,
    /// Exam window.
    pub exam_id: ExamId,
    /// Quota the seat was claimed from.
    pub quota_id: QuotaId,
    /// Department of the claimed quota.
    pub department_id: DepartmentId,
    /// Category of the claimed quota.
    pub category: Category,
    /// Day the student sits the exam.
    pub slot_date: NaiveDate,
    /// When the booking committed.
    pub booked_at: DateTime<Utc>,
}

impl Booking {
    /// Build the booking row backing a claim on `counter`.
    pub fn for_claim(student_id: StudentId, counter: &QuotaCounter) -> Self {
        Self {
            id: BookingId::new(),
            student_id,
            exam_id: counter.exam_id,
            quota_id: counter.id,
            department_id: counter.department_id,
            category: counter.category,
            slot_date: counter.slot_date,
            booked_at: Utc::now(),
        }
    }
}
