//! The booking store: persistence seam for the quota ledger.
//!
//! [`BookingStore`] is the sole owner of quota counters. A booking attempt
//! runs inside one [`BookingUnit`], which commits or rolls back as a whole;
//! dropping a unit without committing rolls it back.
//!
//! Two backends exist:
//! - [`PgBookingStore`]: PostgreSQL transactions with a conditional
//!   `UPDATE ... WHERE booked < capacity` under `lock_timeout`.
//! - [`MemoryBookingStore`]: per-slot async mutexes with a bounded wait.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use seatbook_core::config::{BookingConfig, StoreBackend};
use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_core::types::{DepartmentId, ExamId, QuotaId, StudentId};
use seatbook_entity::{
    AvailableSlot, Booking, Category, Department, ExamStatus, ExamWindow, QuotaCounter, QuotaKey,
    StudentProfile,
};

pub use memory::MemoryBookingStore;
pub use postgres::PgBookingStore;

/// Result of a claim against one quota counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// One seat was claimed; carries the counter after the increment.
    Claimed(QuotaCounter),
    /// The counter had no room; nothing changed.
    Exhausted,
}

/// Narrowing criteria for booking listings. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingFilter {
    /// Only bookings in this exam.
    pub exam_id: Option<ExamId>,
    /// Only bookings against this slot.
    pub quota_id: Option<QuotaId>,
    /// Only bookings for this department.
    pub department_id: Option<DepartmentId>,
    /// Only bookings held by this student.
    pub student_id: Option<StudentId>,
}

impl BookingFilter {
    /// Whether `booking` satisfies every set field.
    pub fn matches(&self, booking: &Booking) -> bool {
        self.exam_id.is_none_or(|id| booking.exam_id == id)
            && self.quota_id.is_none_or(|id| booking.quota_id == id)
            && self.department_id.is_none_or(|id| booking.department_id == id)
            && self.student_id.is_none_or(|id| booking.student_id == id)
    }
}

/// What an exam teardown removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeardownReport {
    /// The exam removed.
    pub exam_id: ExamId,
    /// Quota counters removed with it.
    pub counters_removed: u64,
    /// Bookings removed with it.
    pub bookings_removed: u64,
}

/// One atomic unit of booking work.
///
/// Reads inside a unit see committed data. The claim taken by
/// [`BookingUnit::try_claim`] holds the slot's exclusive lock until
/// [`BookingUnit::commit`] or [`BookingUnit::rollback`].
#[async_trait]
pub trait BookingUnit: Send {
    /// Resolve a student by roll number.
    async fn find_student(&mut self, roll_no: &str) -> AppResult<Option<StudentProfile>>;

    /// Load an exam window.
    async fn find_exam(&mut self, exam_id: ExamId) -> AppResult<Option<ExamWindow>>;

    /// Load a counter by slot id, without locking it.
    async fn find_counter(&mut self, quota_id: QuotaId) -> AppResult<Option<QuotaCounter>>;

    /// Load a counter by composite key, without locking it.
    async fn find_counter_by_key(&mut self, key: &QuotaKey) -> AppResult<Option<QuotaCounter>>;

    /// Counters of one exam for one partition that still have room, by day.
    async fn open_counters(
        &mut self,
        exam_id: ExamId,
        department_id: DepartmentId,
        category: Category,
    ) -> AppResult<Vec<QuotaCounter>>;

    /// The student's committed booking in `exam_id`, if any.
    async fn find_active_booking(
        &mut self,
        student_id: StudentId,
        exam_id: ExamId,
    ) -> AppResult<Option<Booking>>;

    /// Atomically test `booked < capacity` and increment.
    ///
    /// Fails with `TransientLockTimeout` when the slot lock is not acquired in
    /// time and with `NotFound` when the slot does not exist.
    async fn try_claim(&mut self, quota_id: QuotaId) -> AppResult<ClaimOutcome>;

    /// Stage the booking row. Fails with `AlreadyBooked` when the student
    /// already holds a booking in the same exam.
    async fn insert_booking(&mut self, booking: &Booking) -> AppResult<Booking>;

    /// Make every staged change visible at once.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discard every staged change and release held locks.
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Persistence seam owning departments, students, exams, the quota ledger
/// and bookings.
#[async_trait]
pub trait BookingStore: Send + Sync + std::fmt::Debug + 'static {
    /// Backend name for logging and health output.
    fn backend(&self) -> StoreBackend;

    /// Open a booking unit.
    async fn begin(&self) -> AppResult<Box<dyn BookingUnit>>;

    /// Install an exam and all its counters atomically, leaving it `Open`.
    async fn install_plan(
        &self,
        exam: &ExamWindow,
        counters: &[QuotaCounter],
    ) -> AppResult<ExamWindow>;

    /// Delete an exam with its counters and bookings.
    async fn teardown_exam(&self, exam_id: ExamId) -> AppResult<TeardownReport>;

    /// Load an exam window.
    async fn find_exam(&self, exam_id: ExamId) -> AppResult<Option<ExamWindow>>;

    /// List all exam windows.
    async fn list_exams(&self) -> AppResult<Vec<ExamWindow>>;

    /// Move an installed exam to `status`.
    async fn set_exam_status(&self, exam_id: ExamId, status: ExamStatus)
    -> AppResult<ExamWindow>;

    /// Load a counter by slot id.
    async fn find_counter(&self, quota_id: QuotaId) -> AppResult<Option<QuotaCounter>>;

    /// Load a counter by composite key.
    async fn find_counter_by_key(&self, key: &QuotaKey) -> AppResult<Option<QuotaCounter>>;

    /// All counters of an exam.
    async fn list_counters(&self, exam_id: ExamId) -> AppResult<Vec<QuotaCounter>>;

    /// Decrement `booked` by one, floored at zero, under the slot lock.
    async fn release(&self, quota_id: QuotaId) -> AppResult<QuotaCounter>;

    /// Open slots with room for one partition, from one coherent snapshot.
    async fn available_slots(
        &self,
        department_id: DepartmentId,
        category: Category,
    ) -> AppResult<Vec<AvailableSlot>>;

    /// Committed bookings matching `filter`.
    async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>>;

    /// Register a department.
    async fn insert_department(&self, department: &Department) -> AppResult<Department>;

    /// Load a department by id.
    async fn find_department(&self, id: DepartmentId) -> AppResult<Option<Department>>;

    /// Load a department by code.
    async fn find_department_by_code(&self, code: &str) -> AppResult<Option<Department>>;

    /// List departments.
    async fn list_departments(&self) -> AppResult<Vec<Department>>;

    /// Register a student.
    async fn insert_student(&self, student: &StudentProfile) -> AppResult<StudentProfile>;

    /// Load a student by roll number.
    async fn find_student(&self, roll_no: &str) -> AppResult<Option<StudentProfile>>;

    /// List students, optionally for one department.
    async fn list_students(
        &self,
        department_id: Option<DepartmentId>,
    ) -> AppResult<Vec<StudentProfile>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Build the configured store. The PostgreSQL backend needs a pool.
pub fn build_store(
    config: &BookingConfig,
    pool: Option<sqlx::PgPool>,
) -> AppResult<Arc<dyn BookingStore>> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryBookingStore::new(config.lock_timeout()))),
        StoreBackend::Postgres => {
            let pool = pool.ok_or_else(|| {
                AppError::configuration("The postgres booking backend requires a database pool")
            })?;
            Ok(Arc::new(PgBookingStore::new(pool, config.lock_timeout())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn booking(exam_id: ExamId) -> Booking {
        let key = QuotaKey::new(exam_id, 0, DepartmentId::new(), Category::Day);
        let date = NaiveDate::from_ymd_opt(2026, 11, 2).expect("valid date");
        let counter = QuotaCounter::new(key, date, 5).expect("counter");
        Booking::for_claim(StudentId::new(), &counter)
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(BookingFilter::default().matches(&booking(ExamId::new())));
    }

    #[test]
    fn test_filter_by_exam() {
        let exam_id = ExamId::new();
        let filter = BookingFilter {
            exam_id: Some(exam_id),
            ..Default::default()
        };
        assert!(filter.matches(&booking(exam_id)));
        assert!(!filter.matches(&booking(ExamId::new())));
    }

    #[test]
    fn test_build_postgres_without_pool_fails() {
        let config = BookingConfig {
            backend: StoreBackend::Postgres,
            ..Default::default()
        };
        assert!(build_store(&config, None).is_err());
    }
}
