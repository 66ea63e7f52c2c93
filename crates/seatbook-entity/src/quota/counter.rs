//! Quota counter: one ledger row.

use chrono::NaiveDate;
use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_core::types::{DepartmentId, ExamId, QuotaId};
use serde::Serialize;
use sqlx::FromRow;

use super::QuotaKey;
use crate::student::Category;

/// A capacity counter for one quota key.
///
/// `capacity` and `booked` are readable but not writable from outside this
/// module. The only transitions are [`QuotaCounter::claimed`] and
/// [`QuotaCounter::released`], which return a new snapshot and are applied by
/// the ledger's store under its own lock. Every value of this type satisfies
/// `0 <= booked <= capacity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct QuotaCounter {
    /// Slot ID.
    pub id: QuotaId,
    /// Exam the counter belongs to.
    pub exam_id: ExamId,
    /// 0-based day within the exam window.
    pub day_index: i32,
    /// Calendar date of the day.
    pub slot_date: NaiveDate,
    /// Department partition.
    pub department_id: DepartmentId,
    /// Category partition.
    pub category: Category,
    capacity: i32,
    booked: i32,
}

impl QuotaCounter {
    /// A fresh counter with nothing booked.
    ///
    /// Fails with `Configuration` when `capacity` does not fit the ledger
    /// column.
    pub fn new(key: QuotaKey, slot_date: NaiveDate, capacity: u32) -> AppResult<Self> {
        let capacity = i32::try_from(capacity).map_err(|_| {
            AppError::configuration(format!(
                "Capacity of {capacity} seats for {key} exceeds the per-slot limit of {}",
                i32::MAX
            ))
        })?;
        Ok(Self {
            id: QuotaId::new(),
            exam_id: key.exam_id,
            day_index: key.day_index,
            slot_date,
            department_id: key.department_id,
            category: key.category,
            capacity,
            booked: 0,
        })
    }

    /// The key this counter is addressed by.
    pub fn key(&self) -> QuotaKey {
        QuotaKey::new(self.exam_id, self.day_index, self.department_id, self.category)
    }

    /// Total seats.
    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    /// Seats claimed so far.
    pub fn booked(&self) -> i32 {
        self.booked
    }

    /// Seats still claimable.
    pub fn remaining(&self) -> i32 {
        self.capacity - self.booked
    }

    /// Whether at least one seat is left.
    pub fn has_room(&self) -> bool {
        self.booked < self.capacity
    }

    /// The counter after one successful claim, or `None` when full.
    #[must_use]
    pub fn claimed(&self) -> Option<Self> {
        if !self.has_room() {
            return None;
        }
        Some(Self {
            booked: self.booked + 1,
            ..self.clone()
        })
    }

    /// The counter after one release. Never drops below zero.
    #[must_use]
    pub fn released(&self) -> Self {
        Self {
            booked: (self.booked - 1).max(0),
            ..self.clone()
        }
    }
}
