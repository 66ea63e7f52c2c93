//! Aggregate seat demand for one department/category pair.

use seatbook_core::types::DepartmentId;
use serde::{Deserialize, Serialize};

use crate::student::Category;

/// Requested total seat count for one (department, category) across an
/// exam window. Input to the quota planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandSpec {
    /// Department the seats are reserved for.
    pub department_id: DepartmentId,
    /// Category the seats are reserved for.
    pub category: Category,
    /// Total seats over all days. Must be non-negative.
    pub total: i64,
}

impl DemandSpec {
    /// Build a demand spec.
    pub fn new(department_id: DepartmentId, category: Category, total: i64) -> Self {
        Self {
            department_id,
            category,
            total,
        }
    }
}
