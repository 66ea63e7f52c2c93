//! Cache key builders for every SeatBook cache entry.

use seatbook_core::types::{DepartmentId, ExamId};
use seatbook_entity::Category;

/// Prefix applied to all SeatBook cache keys.
const PREFIX: &str = "seatbook";

/// Cache key for the available-slot listing of one department/category.
pub fn availability(department_id: DepartmentId, category: Category) -> String {
    format!("{PREFIX}:availability:{department_id}:{category}")
}

/// Prefix covering every availability listing.
pub fn availability_prefix() -> String {
    format!("{PREFIX}:availability:")
}

/// Cache key for the admin quota table of one exam.
pub fn exam_quotas(exam_id: ExamId) -> String {
    format!("{PREFIX}:exam:quotas:{exam_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nil_department() -> DepartmentId {
        DepartmentId::from_uuid(Default::default())
    }

    #[test]
    fn test_availability_key() {
        assert_eq!(
            availability(nil_department(), Category::HostelMale),
            "seatbook:availability:00000000-0000-0000-0000-000000000000:HOSTEL_MALE"
        );
    }

    #[test]
    fn test_availability_keys_share_prefix() {
        let key = availability(nil_department(), Category::Day);
        assert!(key.starts_with(&availability_prefix()));
        assert!(!exam_quotas(ExamId::new()).starts_with(&availability_prefix()));
    }
}
