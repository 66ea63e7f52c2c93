//! Department reference data.

use chrono::{DateTime, Utc};
use seatbook_core::types::DepartmentId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An academic department. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Department {
    /// Department ID.
    pub id: DepartmentId,
    /// Short unique code, e.g. `CSE`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// When the department was registered.
    pub created_at: DateTime<Utc>,
}

impl Department {
    /// Build a new department with a fresh id. Codes are stored upper-case.
    pub fn new(code: &str, name: impl Into<String>) -> Self {
        Self {
            id: DepartmentId::new(),
            code: code.trim().to_uppercase(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_normalised() {
        let dept = Department::new(" cse ", "Computer Science");
        assert_eq!(dept.code, "CSE");
    }
}
