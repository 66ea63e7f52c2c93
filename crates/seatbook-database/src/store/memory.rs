//! In-process booking store for tests and single-node deployments.
//!
//! Tables live behind one `RwLock`. Exclusive access to a quota slot is a
//! per-slot `tokio::sync::Mutex` taken with a bounded wait, held by the unit
//! from claim until commit or rollback. A second per-(student, exam) entry
//! lock plays the role of the unique index on bookings: a concurrent unit
//! for the same student waits on it and then sees the committed booking.
//! Staged changes become visible together under one write guard, so readers
//! never observe a claim without its booking.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info, warn};

use seatbook_core::config::StoreBackend;
use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_core::types::{BookingId, DepartmentId, ExamId, QuotaId, StudentId};
use seatbook_entity::{
    AvailableSlot, Booking, Category, Department, ExamStatus, ExamWindow, QuotaCounter, QuotaKey,
    StudentProfile,
};

use super::{BookingFilter, BookingStore, BookingUnit, ClaimOutcome, TeardownReport};

type LockTable<K> = DashMap<K, Arc<Mutex<()>>>;

#[derive(Debug, Default)]
struct Tables {
    departments: HashMap<DepartmentId, Department>,
    students: HashMap<StudentId, StudentProfile>,
    exams: HashMap<ExamId, ExamWindow>,
    counters: HashMap<QuotaId, QuotaCounter>,
    bookings: HashMap<BookingId, Booking>,
}

impl Tables {
    fn booking_of(&self, student_id: StudentId, exam_id: ExamId) -> Option<&Booking> {
        self.bookings
            .values()
            .find(|b| b.student_id == student_id && b.exam_id == exam_id)
    }

    fn counter_by_key(&self, key: &QuotaKey) -> Option<&QuotaCounter> {
        self.counters.values().find(|c| c.key() == *key)
    }
}

/// Booking store held entirely in process memory.
#[derive(Debug, Clone)]
pub struct MemoryBookingStore {
    tables: Arc<RwLock<Tables>>,
    slot_locks: Arc<LockTable<QuotaId>>,
    entry_locks: Arc<LockTable<(StudentId, ExamId)>>,
    lock_timeout: Duration,
}

impl MemoryBookingStore {
    /// Create an empty store. Lock waits longer than `lock_timeout` fail with
    /// `TransientLockTimeout`.
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            slot_locks: Arc::new(DashMap::new()),
            entry_locks: Arc::new(DashMap::new()),
            lock_timeout,
        }
    }

    /// Lock an existing slot. Unknown ids fail before a lock entry is created.
    async fn lock_slot(&self, quota_id: QuotaId) -> AppResult<OwnedMutexGuard<()>> {
        if !self.tables.read().await.counters.contains_key(&quota_id) {
            return Err(not_found("Quota slot", quota_id));
        }
        acquire(&self.slot_locks, quota_id, self.lock_timeout, "quota slot").await
    }

    async fn lock_entry(
        &self,
        student_id: StudentId,
        exam_id: ExamId,
    ) -> AppResult<OwnedMutexGuard<()>> {
        acquire(
            &self.entry_locks,
            (student_id, exam_id),
            self.lock_timeout,
            "booking entry",
        )
        .await
    }
}

async fn acquire<K>(
    locks: &LockTable<K>,
    key: K,
    timeout: Duration,
    what: &str,
) -> AppResult<OwnedMutexGuard<()>>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    let lock = locks
        .entry(key.clone())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone();

    tokio::time::timeout(timeout, lock.lock_owned())
        .await
        .map_err(|_| {
            warn!(key = ?key, timeout_ms = timeout.as_millis() as u64, "Lock wait timed out");
            AppError::lock_timeout(format!(
                "Timed out after {}ms waiting for the {what} lock",
                timeout.as_millis()
            ))
        })
}

fn not_found(what: &str, id: impl Display) -> AppError {
    AppError::not_found(format!("{what} {id} not found"))
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Memory
    }

    async fn begin(&self) -> AppResult<Box<dyn BookingUnit>> {
        Ok(Box::new(MemoryBookingUnit {
            store: self.clone(),
            claim: None,
            booking: None,
        }))
    }

    async fn install_plan(
        &self,
        exam: &ExamWindow,
        counters: &[QuotaCounter],
    ) -> AppResult<ExamWindow> {
        let mut tables = self.tables.write().await;

        if tables.exams.contains_key(&exam.id) {
            return Err(AppError::conflict(format!("Exam {} already exists", exam.id)));
        }
        let mut seen = HashMap::with_capacity(counters.len());
        for counter in counters {
            if counter.exam_id != exam.id {
                return Err(AppError::internal(format!(
                    "Quota slot {} does not belong to exam {}",
                    counter.id, exam.id
                )));
            }
            if !tables.departments.contains_key(&counter.department_id) {
                return Err(not_found("Department", counter.department_id));
            }
            if seen.insert(counter.key(), counter.id).is_some()
                || tables.counters.contains_key(&counter.id)
            {
                return Err(AppError::conflict(format!(
                    "Duplicate quota key {}",
                    counter.key()
                )));
            }
        }

        let opened = ExamWindow {
            status: ExamStatus::Open,
            ..exam.clone()
        };
        tables.exams.insert(opened.id, opened.clone());
        for counter in counters {
            tables.counters.insert(counter.id, counter.clone());
        }

        info!(exam_id = %opened.id, counters = counters.len(), "Exam plan installed");
        Ok(opened)
    }

    async fn teardown_exam(&self, exam_id: ExamId) -> AppResult<TeardownReport> {
        let mut tables = self.tables.write().await;

        if tables.exams.remove(&exam_id).is_none() {
            return Err(not_found("Exam", exam_id));
        }
        let counters_before = tables.counters.len();
        tables.counters.retain(|_, c| c.exam_id != exam_id);
        let bookings_before = tables.bookings.len();
        tables.bookings.retain(|_, b| b.exam_id != exam_id);

        let report = TeardownReport {
            exam_id,
            counters_removed: (counters_before - tables.counters.len()) as u64,
            bookings_removed: (bookings_before - tables.bookings.len()) as u64,
        };
        drop(tables);

        self.entry_locks.retain(|(_, exam), _| *exam != exam_id);
        let live = self.tables.read().await;
        self.slot_locks.retain(|id, _| live.counters.contains_key(id));

        Ok(report)
    }

    async fn find_exam(&self, exam_id: ExamId) -> AppResult<Option<ExamWindow>> {
        Ok(self.tables.read().await.exams.get(&exam_id).cloned())
    }

    async fn list_exams(&self) -> AppResult<Vec<ExamWindow>> {
        let mut exams: Vec<ExamWindow> = self.tables.read().await.exams.values().cloned().collect();
        exams.sort_by(|a, b| {
            b.start_date
                .cmp(&a.start_date)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(exams)
    }

    async fn set_exam_status(
        &self,
        exam_id: ExamId,
        status: ExamStatus,
    ) -> AppResult<ExamWindow> {
        let mut tables = self.tables.write().await;
        match tables.exams.get_mut(&exam_id) {
            Some(exam) if exam.status != ExamStatus::Generating => {
                exam.status = status;
                Ok(exam.clone())
            }
            _ => Err(not_found("Exam", exam_id)),
        }
    }

    async fn find_counter(&self, quota_id: QuotaId) -> AppResult<Option<QuotaCounter>> {
        Ok(self.tables.read().await.counters.get(&quota_id).cloned())
    }

    async fn find_counter_by_key(&self, key: &QuotaKey) -> AppResult<Option<QuotaCounter>> {
        Ok(self.tables.read().await.counter_by_key(key).cloned())
    }

    async fn list_counters(&self, exam_id: ExamId) -> AppResult<Vec<QuotaCounter>> {
        let tables = self.tables.read().await;
        let mut counters: Vec<QuotaCounter> = tables
            .counters
            .values()
            .filter(|c| c.exam_id == exam_id)
            .cloned()
            .collect();
        counters.sort_by_key(|c| (c.day_index, c.department_id, c.category));
        Ok(counters)
    }

    async fn release(&self, quota_id: QuotaId) -> AppResult<QuotaCounter> {
        let _slot = self.lock_slot(quota_id).await?;
        let mut tables = self.tables.write().await;
        let counter = tables
            .counters
            .get_mut(&quota_id)
            .ok_or_else(|| not_found("Quota slot", quota_id))?;
        *counter = counter.released();
        Ok(counter.clone())
    }

    async fn available_slots(
        &self,
        department_id: DepartmentId,
        category: Category,
    ) -> AppResult<Vec<AvailableSlot>> {
        let tables = self.tables.read().await;
        let mut slots: Vec<AvailableSlot> = tables
            .counters
            .values()
            .filter(|c| c.department_id == department_id && c.category == category && c.has_room())
            .filter_map(|c| {
                let exam = tables.exams.get(&c.exam_id).filter(|e| e.is_open())?;
                Some(AvailableSlot {
                    quota_id: c.id,
                    exam_id: c.exam_id,
                    exam_name: exam.name.clone(),
                    day_index: c.day_index,
                    slot_date: c.slot_date,
                    category: c.category,
                    remaining: c.remaining(),
                })
            })
            .collect();
        slots.sort_by(|a, b| {
            a.slot_date
                .cmp(&b.slot_date)
                .then_with(|| a.exam_name.cmp(&b.exam_name))
                .then_with(|| a.day_index.cmp(&b.day_index))
        });
        Ok(slots)
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>> {
        let tables = self.tables.read().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        bookings.sort_by_key(|b| (b.booked_at, b.id));
        Ok(bookings)
    }

    async fn insert_department(&self, department: &Department) -> AppResult<Department> {
        let mut tables = self.tables.write().await;
        if tables
            .departments
            .values()
            .any(|d| d.code.eq_ignore_ascii_case(&department.code))
        {
            return Err(AppError::conflict(format!(
                "Department code '{}' already exists",
                department.code
            )));
        }
        tables
            .departments
            .insert(department.id, department.clone());
        Ok(department.clone())
    }

    async fn find_department(&self, id: DepartmentId) -> AppResult<Option<Department>> {
        Ok(self.tables.read().await.departments.get(&id).cloned())
    }

    async fn find_department_by_code(&self, code: &str) -> AppResult<Option<Department>> {
        let code = code.trim();
        Ok(self
            .tables
            .read()
            .await
            .departments
            .values()
            .find(|d| d.code.eq_ignore_ascii_case(code))
            .cloned())
    }

    async fn list_departments(&self) -> AppResult<Vec<Department>> {
        let mut departments: Vec<Department> =
            self.tables.read().await.departments.values().cloned().collect();
        departments.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(departments)
    }

    async fn insert_student(&self, student: &StudentProfile) -> AppResult<StudentProfile> {
        let mut tables = self.tables.write().await;
        if !tables.departments.contains_key(&student.department_id) {
            return Err(not_found("Department", student.department_id));
        }
        if tables.students.values().any(|s| s.roll_no == student.roll_no) {
            return Err(AppError::conflict(format!(
                "Roll number '{}' already exists",
                student.roll_no
            )));
        }
        tables.students.insert(student.id, student.clone());
        Ok(student.clone())
    }

    async fn find_student(&self, roll_no: &str) -> AppResult<Option<StudentProfile>> {
        let roll_no = roll_no.trim();
        Ok(self
            .tables
            .read()
            .await
            .students
            .values()
            .find(|s| s.roll_no == roll_no)
            .cloned())
    }

    async fn list_students(
        &self,
        department_id: Option<DepartmentId>,
    ) -> AppResult<Vec<StudentProfile>> {
        let tables = self.tables.read().await;
        let mut students: Vec<StudentProfile> = tables
            .students
            .values()
            .filter(|s| department_id.is_none_or(|d| s.department_id == d))
            .cloned()
            .collect();
        students.sort_by(|a, b| a.roll_no.cmp(&b.roll_no));
        Ok(students)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

struct StagedClaim {
    quota_id: QuotaId,
    _slot: OwnedMutexGuard<()>,
}

struct StagedBooking {
    booking: Booking,
    _entry: OwnedMutexGuard<()>,
}

/// A booking unit over [`MemoryBookingStore`].
///
/// Holds at most one slot lock and one entry lock. Dropping the unit releases
/// both and discards what was staged.
pub struct MemoryBookingUnit {
    store: MemoryBookingStore,
    claim: Option<StagedClaim>,
    booking: Option<StagedBooking>,
}

#[async_trait]
impl BookingUnit for MemoryBookingUnit {
    async fn find_student(&mut self, roll_no: &str) -> AppResult<Option<StudentProfile>> {
        self.store.find_student(roll_no).await
    }

    async fn find_exam(&mut self, exam_id: ExamId) -> AppResult<Option<ExamWindow>> {
        self.store.find_exam(exam_id).await
    }

    async fn find_counter(&mut self, quota_id: QuotaId) -> AppResult<Option<QuotaCounter>> {
        self.store.find_counter(quota_id).await
    }

    async fn find_counter_by_key(&mut self, key: &QuotaKey) -> AppResult<Option<QuotaCounter>> {
        self.store.find_counter_by_key(key).await
    }

    async fn open_counters(
        &mut self,
        exam_id: ExamId,
        department_id: DepartmentId,
        category: Category,
    ) -> AppResult<Vec<QuotaCounter>> {
        let tables = self.store.tables.read().await;
        let mut counters: Vec<QuotaCounter> = tables
            .counters
            .values()
            .filter(|c| {
                c.exam_id == exam_id
                    && c.department_id == department_id
                    && c.category == category
                    && c.has_room()
            })
            .cloned()
            .collect();
        counters.sort_by_key(|c| c.day_index);
        Ok(counters)
    }

    async fn find_active_booking(
        &mut self,
        student_id: StudentId,
        exam_id: ExamId,
    ) -> AppResult<Option<Booking>> {
        let tables = self.store.tables.read().await;
        Ok(tables.booking_of(student_id, exam_id).cloned())
    }

    async fn try_claim(&mut self, quota_id: QuotaId) -> AppResult<ClaimOutcome> {
        if self.claim.is_some() {
            return Err(AppError::internal(
                "A booking unit may claim from only one quota slot",
            ));
        }

        let slot = self.store.lock_slot(quota_id).await?;
        let tables = self.store.tables.read().await;
        let counter = tables
            .counters
            .get(&quota_id)
            .ok_or_else(|| not_found("Quota slot", quota_id))?;

        match counter.claimed() {
            Some(next) => {
                drop(tables);
                debug!(quota_id = %quota_id, booked = next.booked(), "Quota seat claimed");
                self.claim = Some(StagedClaim {
                    quota_id,
                    _slot: slot,
                });
                Ok(ClaimOutcome::Claimed(next))
            }
            None => Ok(ClaimOutcome::Exhausted),
        }
    }

    async fn insert_booking(&mut self, booking: &Booking) -> AppResult<Booking> {
        if let Some(staged) = &self.booking {
            if staged.booking.student_id == booking.student_id
                && staged.booking.exam_id == booking.exam_id
            {
                return Err(AppError::already_booked(
                    "Student already holds a booking for this exam",
                ));
            }
            return Err(AppError::internal(
                "A booking unit may insert only one booking",
            ));
        }

        let entry = self
            .store
            .lock_entry(booking.student_id, booking.exam_id)
            .await?;
        let tables = self.store.tables.read().await;

        if tables.booking_of(booking.student_id, booking.exam_id).is_some() {
            return Err(AppError::already_booked(
                "Student already holds a booking for this exam",
            ));
        }
        if !tables.students.contains_key(&booking.student_id) {
            return Err(not_found("Student", booking.student_id));
        }
        if !tables.counters.contains_key(&booking.quota_id) {
            return Err(not_found("Quota slot", booking.quota_id));
        }
        drop(tables);

        self.booking = Some(StagedBooking {
            booking: booking.clone(),
            _entry: entry,
        });
        Ok(booking.clone())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut tables = self.store.tables.write().await;

        let claimed = match &self.claim {
            Some(claim) => {
                let current = tables
                    .counters
                    .get(&claim.quota_id)
                    .ok_or_else(|| not_found("Quota slot", claim.quota_id))?;
                let next = current.claimed().ok_or_else(|| {
                    AppError::quota_exhausted(format!("Quota slot {} is full", claim.quota_id))
                })?;
                Some(next)
            }
            None => None,
        };

        if let Some(staged) = &self.booking {
            let booking = &staged.booking;
            if !tables.exams.contains_key(&booking.exam_id) {
                return Err(not_found("Exam", booking.exam_id));
            }
            if tables.booking_of(booking.student_id, booking.exam_id).is_some() {
                return Err(AppError::already_booked(
                    "Student already holds a booking for this exam",
                ));
            }
        }

        if let Some(next) = claimed {
            tables.counters.insert(next.id, next);
        }
        if let Some(staged) = &self.booking {
            tables
                .bookings
                .insert(staged.booking.id, staged.booking.clone());
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
