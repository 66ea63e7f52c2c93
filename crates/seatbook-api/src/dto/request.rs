//! Request DTOs with validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use seatbook_core::error::AppError;
use seatbook_core::types::{DepartmentId, ExamId, QuotaId};
use seatbook_entity::{QuotaKey, StudentProfile};
use seatbook_service::BookingTarget;

/// Booking request body.
///
/// Exactly one shape is accepted: `slot_id`; `exam_id` with `day_index`;
/// or `exam_id` with an optional `preferred_date`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BookRequest {
    /// Slot id from an availability listing.
    pub slot_id: Option<Uuid>,
    /// Exam to book in.
    pub exam_id: Option<Uuid>,
    /// Day offset within the exam.
    #[validate(range(min = 0))]
    pub day_index: Option<i32>,
    /// Preferred calendar day.
    pub preferred_date: Option<NaiveDate>,
}

impl BookRequest {
    /// Resolve the body to a target in `student`'s own partition.
    pub fn into_target(self, student: &StudentProfile) -> Result<BookingTarget, AppError> {
        match (self.slot_id, self.exam_id, self.day_index, self.preferred_date) {
            (Some(slot_id), None, None, None) => {
                Ok(BookingTarget::slot(QuotaId::from_uuid(slot_id)))
            }
            (None, Some(exam_id), Some(day_index), None) => Ok(BookingTarget::Key(QuotaKey::new(
                ExamId::from_uuid(exam_id),
                day_index,
                student.department_id,
                student.category,
            ))),
            (None, Some(exam_id), None, preferred_date) => Ok(BookingTarget::exam(
                ExamId::from_uuid(exam_id),
                preferred_date,
            )),
            _ => Err(AppError::validation(
                "Provide slot_id, or exam_id with at most one of day_index and preferred_date",
            )),
        }
    }
}

/// Create department request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDepartmentRequest {
    /// Short unique code.
    #[validate(length(min = 1, max = 16))]
    pub code: String,
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

/// Create student request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateStudentRequest {
    /// Unique roll number.
    #[validate(length(min = 1, max = 32))]
    pub roll_no: String,
    /// Full name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Contact email.
    #[validate(email)]
    pub email: Option<String>,
    /// Department code.
    #[validate(length(min = 1, max = 16))]
    pub department_code: String,
    /// Category name or numeric code (`DAY`, `HOSTEL_MALE`, `2`, ...).
    pub category: String,
}

/// One department/category demand in a create-exam request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DemandRequest {
    /// Department code.
    #[validate(length(min = 1, max = 16))]
    pub department_code: String,
    /// Category name or numeric code.
    pub category: String,
    /// Total seats over the window. Range is checked by the planner.
    pub total: i64,
}

/// Create exam request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateExamRequest {
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// First exam day.
    pub start_date: NaiveDate,
    /// Number of exam days.
    pub day_count: i32,
    /// Demand per department/category.
    #[validate(nested)]
    pub demands: Vec<DemandRequest>,
}

/// Change exam status request (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateExamStatusRequest {
    /// `OPEN` or `CLOSED`.
    pub status: String,
}

/// Query parameters for the admin booking listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingQuery {
    /// Only this exam.
    pub exam_id: Option<Uuid>,
    /// Only this slot.
    pub slot_id: Option<Uuid>,
    /// Only this department.
    pub department_id: Option<Uuid>,
}

/// Query parameters for the admin student listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentQuery {
    /// Only this department code.
    pub department: Option<String>,
}

impl BookingQuery {
    /// Convert into a store filter.
    pub fn into_filter(self) -> seatbook_database::BookingFilter {
        seatbook_database::BookingFilter {
            exam_id: self.exam_id.map(ExamId::from_uuid),
            quota_id: self.slot_id.map(QuotaId::from_uuid),
            department_id: self.department_id.map(DepartmentId::from_uuid),
            student_id: None,
        }
    }
}
