//! Student profile entity.

use chrono::{DateTime, Utc};
use seatbook_core::types::{DepartmentId, StudentId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Category;

/// A student eligible to book an exam seat.
///
/// The roll number is the external identity; `id` is internal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StudentProfile {
    /// Internal student ID.
    pub id: StudentId,
    /// Unique roll number.
    pub roll_no: String,
    /// Full name.
    pub name: String,
    /// Contact email, when known.
    pub email: Option<String>,
    /// Owning department.
    pub department_id: DepartmentId,
    /// Residential category.
    pub category: Category,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}

impl StudentProfile {
    /// Build a new profile with a fresh id.
    pub fn new(
        roll_no: &str,
        name: impl Into<String>,
        email: Option<String>,
        department_id: DepartmentId,
        category: Category,
    ) -> Self {
        Self {
            id: StudentId::new(),
            roll_no: roll_no.trim().to_string(),
            name: name.into(),
            email,
            department_id,
            category,
            created_at: Utc::now(),
        }
    }

    /// Whether this student may use a quota partitioned by `department_id`/`category`.
    pub fn matches(&self, department_id: DepartmentId, category: Category) -> bool {
        self.department_id == department_id && self.category == category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_requires_both_fields() {
        let dept = DepartmentId::new();
        let student = StudentProfile::new("21CS001", "Asha", None, dept, Category::Day);
        assert!(student.matches(dept, Category::Day));
        assert!(!student.matches(dept, Category::HostelMale));
        assert!(!student.matches(DepartmentId::new(), Category::Day));
    }
}
