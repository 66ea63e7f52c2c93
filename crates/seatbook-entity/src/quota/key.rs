//! Composite quota key.

use std::fmt;

use seatbook_core::types::{DepartmentId, ExamId};
use serde::{Deserialize, Serialize};

use crate::student::Category;

/// Addresses exactly one capacity counter: one exam day for one
/// department/category pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuotaKey {
    /// Exam the counter belongs to.
    pub exam_id: ExamId,
    /// 0-based day within the exam window.
    pub day_index: i32,
    /// Department partition.
    pub department_id: DepartmentId,
    /// Category partition.
    pub category: Category,
}

impl QuotaKey {
    /// Build a quota key.
    pub fn new(
        exam_id: ExamId,
        day_index: i32,
        department_id: DepartmentId,
        category: Category,
    ) -> Self {
        Self {
            exam_id,
            day_index,
            department_id,
            category,
        }
    }
}

impl fmt::Display for QuotaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/day{}/{}/{}",
            self.exam_id, self.day_index, self.department_id, self.category
        )
    }
}
