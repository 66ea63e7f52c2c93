//! What a student can book right now.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_core::types::{DepartmentId, ExamId};
use seatbook_database::BookingStore;
use seatbook_entity::{AvailableSlot, Category, StudentProfile};

/// Remaining seats in one exam for one partition, summed over its days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamAvailability {
    /// Exam.
    pub exam_id: ExamId,
    /// Exam display name.
    pub exam_name: String,
    /// Earliest day with seats left.
    pub first_date: NaiveDate,
    /// Days with seats left.
    pub days_available: usize,
    /// Seats left across those days.
    pub remaining: i64,
}

/// Non-mutating availability queries. Every listing comes from one store
/// snapshot.
#[derive(Debug, Clone)]
pub struct AvailabilityView {
    store: Arc<dyn BookingStore>,
}

impl AvailabilityView {
    /// Create a view over `store`.
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Resolve a student by roll number.
    pub async fn student(&self, roll_no: &str) -> AppResult<StudentProfile> {
        self.store
            .find_student(roll_no)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Student '{roll_no}' not found")))
    }

    /// Open days with seats left for `roll_no`, ordered by date.
    pub async fn list_available(&self, roll_no: &str) -> AppResult<Vec<AvailableSlot>> {
        let student = self.student(roll_no).await?;
        self.for_partition(student.department_id, student.category)
            .await
    }

    /// Open days with seats left for one department/category.
    pub async fn for_partition(
        &self,
        department_id: DepartmentId,
        category: Category,
    ) -> AppResult<Vec<AvailableSlot>> {
        self.store.available_slots(department_id, category).await
    }

    /// Per-exam totals for `roll_no`, earliest exam first.
    pub async fn list_available_exams(&self, roll_no: &str) -> AppResult<Vec<ExamAvailability>> {
        Ok(summarize(&self.list_available(roll_no).await?))
    }
}

/// Group per-day slots into per-exam totals, ordered by first date.
pub fn summarize(slots: &[AvailableSlot]) -> Vec<ExamAvailability> {
    let mut by_exam: BTreeMap<ExamId, ExamAvailability> = BTreeMap::new();
    for slot in slots {
        let entry = by_exam
            .entry(slot.exam_id)
            .or_insert_with(|| ExamAvailability {
                exam_id: slot.exam_id,
                exam_name: slot.exam_name.clone(),
                first_date: slot.slot_date,
                days_available: 0,
                remaining: 0,
            });
        entry.first_date = entry.first_date.min(slot.slot_date);
        entry.days_available += 1;
        entry.remaining += i64::from(slot.remaining);
    }

    let mut exams: Vec<ExamAvailability> = by_exam.into_values().collect();
    exams.sort_by(|a, b| {
        a.first_date
            .cmp(&b.first_date)
            .then_with(|| a.exam_name.cmp(&b.exam_name))
    });
    exams
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatbook_core::types::QuotaId;

    fn slot(exam_id: ExamId, name: &str, day: u32, remaining: i32) -> AvailableSlot {
        AvailableSlot {
            quota_id: QuotaId::new(),
            exam_id,
            exam_name: name.to_string(),
            day_index: day as i32,
            slot_date: NaiveDate::from_ymd_opt(2026, 11, day + 1).expect("valid date"),
            category: Category::Day,
            remaining,
        }
    }

    #[test]
    fn test_summarize_groups_by_exam() {
        let mid = ExamId::new();
        let end = ExamId::new();
        let slots = vec![
            slot(mid, "Midterm", 1, 4),
            slot(end, "Endsem", 3, 2),
            slot(mid, "Midterm", 2, 3),
        ];
        let summary = summarize(&slots);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].exam_name, "Midterm");
        assert_eq!(summary[0].remaining, 7);
        assert_eq!(summary[0].days_available, 2);
        assert_eq!(summary[1].remaining, 2);
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(&[]).is_empty());
    }
}
