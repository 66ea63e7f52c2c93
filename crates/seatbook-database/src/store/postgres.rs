//! PostgreSQL booking store.
//!
//! Every booking unit is a transaction that starts with
//! `SET LOCAL lock_timeout`, so a claim blocked behind another transaction's
//! row lock fails with SQLSTATE 55P03 (mapped to `TransientLockTimeout`)
//! instead of waiting indefinitely. The claim itself is a single conditional
//! `UPDATE`, which takes the row lock and tests `booked < capacity` in one
//! step. The `bookings_student_exam_key` unique constraint rejects a second
//! booking by the same student inside the same transaction, which rolls back
//! the claim with it.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{debug, info};

use seatbook_core::config::StoreBackend;
use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_core::types::{DepartmentId, ExamId, QuotaId, StudentId};
use seatbook_entity::{
    AvailableSlot, Booking, Category, Department, ExamStatus, ExamWindow, QuotaCounter, QuotaKey,
    StudentProfile,
};

use super::{BookingFilter, BookingStore, BookingUnit, ClaimOutcome, TeardownReport};
use crate::error::map_sqlx;
use crate::repositories::{
    BookingRepository, DepartmentRepository, ExamRepository, QuotaRepository, StudentRepository,
};

/// Rows per multi-row `INSERT` when installing a plan. Eight binds per row
/// keeps each statement well under the 65535 parameter limit.
const INSERT_CHUNK: usize = 1000;

/// Booking store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgBookingStore {
    pool: PgPool,
    lock_timeout: Duration,
    departments: DepartmentRepository,
    students: StudentRepository,
    exams: ExamRepository,
    quotas: QuotaRepository,
    bookings: BookingRepository,
}

impl PgBookingStore {
    /// Create a store over `pool`.
    pub fn new(pool: PgPool, lock_timeout: Duration) -> Self {
        Self {
            departments: DepartmentRepository::new(pool.clone()),
            students: StudentRepository::new(pool.clone()),
            exams: ExamRepository::new(pool.clone()),
            quotas: QuotaRepository::new(pool.clone()),
            bookings: BookingRepository::new(pool.clone()),
            pool,
            lock_timeout,
        }
    }

    /// Open a transaction with the configured lock timeout applied.
    async fn begin_tx(&self) -> AppResult<Transaction<'static, Postgres>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx("Failed to begin transaction", e))?;

        let statement = format!(
            "SET LOCAL lock_timeout = '{}ms'",
            self.lock_timeout.as_millis().max(1)
        );
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx("Failed to set lock timeout", e))?;

        Ok(tx)
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Postgres
    }

    async fn begin(&self) -> AppResult<Box<dyn BookingUnit>> {
        let tx = self.begin_tx().await?;
        Ok(Box::new(PgBookingUnit { tx }))
    }

    async fn install_plan(
        &self,
        exam: &ExamWindow,
        counters: &[QuotaCounter],
    ) -> AppResult<ExamWindow> {
        let mut tx = self.begin_tx().await?;

        sqlx::query(
            "INSERT INTO exams (id, name, start_date, day_count, status, created_at) \
             VALUES ($1, $2, $3, $4, 'GENERATING', $5)",
        )
        .bind(exam.id)
        .bind(&exam.name)
        .bind(exam.start_date)
        .bind(exam.day_count)
        .bind(exam.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx("Failed to insert exam", e))?;

        for chunk in counters.chunks(INSERT_CHUNK) {
            let mut insert: QueryBuilder<'_, Postgres> = QueryBuilder::new(
                "INSERT INTO quota_counters \
                 (id, exam_id, day_index, slot_date, department_id, category, capacity, booked) ",
            );
            insert.push_values(chunk, |mut row, counter| {
                row.push_bind(counter.id)
                    .push_bind(counter.exam_id)
                    .push_bind(counter.day_index)
                    .push_bind(counter.slot_date)
                    .push_bind(counter.department_id)
                    .push_bind(counter.category)
                    .push_bind(counter.capacity())
                    .push_bind(counter.booked());
            });
            insert
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx("Failed to insert quota counters", e))?;
        }

        let opened = sqlx::query_as::<_, ExamWindow>(
            "UPDATE exams SET status = 'OPEN' WHERE id = $1 RETURNING *",
        )
        .bind(exam.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx("Failed to open exam", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx("Failed to commit exam plan", e))?;

        info!(
            exam_id = %opened.id,
            counters = counters.len(),
            "Exam plan installed"
        );
        Ok(opened)
    }

    async fn teardown_exam(&self, exam_id: ExamId) -> AppResult<TeardownReport> {
        let mut tx = self.begin_tx().await?;

        let exists: Option<ExamId> =
            sqlx::query_scalar("SELECT id FROM exams WHERE id = $1 FOR UPDATE")
                .bind(exam_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx("Failed to lock exam", e))?;
        if exists.is_none() {
            return Err(AppError::not_found(format!("Exam {exam_id} not found")));
        }

        let bookings_removed: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE exam_id = $1")
                .bind(exam_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx("Failed to count bookings", e))?;
        let counters_removed: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM quota_counters WHERE exam_id = $1")
                .bind(exam_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx("Failed to count quota counters", e))?;

        sqlx::query("DELETE FROM exams WHERE id = $1")
            .bind(exam_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx("Failed to delete exam", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx("Failed to commit exam teardown", e))?;

        Ok(TeardownReport {
            exam_id,
            counters_removed: counters_removed.max(0) as u64,
            bookings_removed: bookings_removed.max(0) as u64,
        })
    }

    async fn find_exam(&self, exam_id: ExamId) -> AppResult<Option<ExamWindow>> {
        self.exams.find_by_id(exam_id).await
    }

    async fn list_exams(&self) -> AppResult<Vec<ExamWindow>> {
        self.exams.find_all().await
    }

    async fn set_exam_status(
        &self,
        exam_id: ExamId,
        status: ExamStatus,
    ) -> AppResult<ExamWindow> {
        self.exams
            .update_status(exam_id, status)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Exam {exam_id} not found")))
    }

    async fn find_counter(&self, quota_id: QuotaId) -> AppResult<Option<QuotaCounter>> {
        self.quotas.find_by_id(quota_id).await
    }

    async fn find_counter_by_key(&self, key: &QuotaKey) -> AppResult<Option<QuotaCounter>> {
        self.quotas.find_by_key(key).await
    }

    async fn list_counters(&self, exam_id: ExamId) -> AppResult<Vec<QuotaCounter>> {
        self.quotas.find_by_exam(exam_id).await
    }

    async fn release(&self, quota_id: QuotaId) -> AppResult<QuotaCounter> {
        let mut tx = self.begin_tx().await?;

        let released = sqlx::query_as::<_, QuotaCounter>(
            "UPDATE quota_counters SET booked = GREATEST(booked - 1, 0) \
             WHERE id = $1 RETURNING *",
        )
        .bind(quota_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx("Failed to release quota seat", e))?
        .ok_or_else(|| AppError::not_found(format!("Quota slot {quota_id} not found")))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx("Failed to commit quota release", e))?;
        Ok(released)
    }

    async fn available_slots(
        &self,
        department_id: DepartmentId,
        category: Category,
    ) -> AppResult<Vec<AvailableSlot>> {
        self.quotas.find_available(department_id, category).await
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>> {
        self.bookings.find_filtered(filter).await
    }

    async fn insert_department(&self, department: &Department) -> AppResult<Department> {
        self.departments.create(department).await
    }

    async fn find_department(&self, id: DepartmentId) -> AppResult<Option<Department>> {
        self.departments.find_by_id(id).await
    }

    async fn find_department_by_code(&self, code: &str) -> AppResult<Option<Department>> {
        self.departments.find_by_code(code).await
    }

    async fn list_departments(&self) -> AppResult<Vec<Department>> {
        self.departments.find_all().await
    }

    async fn insert_student(&self, student: &StudentProfile) -> AppResult<StudentProfile> {
        self.students.create(student).await
    }

    async fn find_student(&self, roll_no: &str) -> AppResult<Option<StudentProfile>> {
        self.students.find_by_roll_no(roll_no).await
    }

    async fn list_students(
        &self,
        department_id: Option<DepartmentId>,
    ) -> AppResult<Vec<StudentProfile>> {
        self.students.find_all(department_id).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| map_sqlx("Health check failed", e))
    }
}

/// A booking unit backed by one PostgreSQL transaction.
///
/// Dropping the unit without committing drops the transaction, which sqlx
/// rolls back.
pub struct PgBookingUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl BookingUnit for PgBookingUnit {
    async fn find_student(&mut self, roll_no: &str) -> AppResult<Option<StudentProfile>> {
        sqlx::query_as::<_, StudentProfile>("SELECT * FROM students WHERE roll_no = $1")
            .bind(roll_no.trim())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx("Failed to find student by roll number", e))
    }

    async fn find_exam(&mut self, exam_id: ExamId) -> AppResult<Option<ExamWindow>> {
        sqlx::query_as::<_, ExamWindow>("SELECT * FROM exams WHERE id = $1")
            .bind(exam_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx("Failed to find exam by id", e))
    }

    async fn find_counter(&mut self, quota_id: QuotaId) -> AppResult<Option<QuotaCounter>> {
        sqlx::query_as::<_, QuotaCounter>("SELECT * FROM quota_counters WHERE id = $1")
            .bind(quota_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx("Failed to find quota counter", e))
    }

    async fn find_counter_by_key(&mut self, key: &QuotaKey) -> AppResult<Option<QuotaCounter>> {
        sqlx::query_as::<_, QuotaCounter>(
            "SELECT * FROM quota_counters \
             WHERE exam_id = $1 AND day_index = $2 AND department_id = $3 AND category = $4",
        )
        .bind(key.exam_id)
        .bind(key.day_index)
        .bind(key.department_id)
        .bind(key.category)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx("Failed to find quota counter by key", e))
    }

    async fn open_counters(
        &mut self,
        exam_id: ExamId,
        department_id: DepartmentId,
        category: Category,
    ) -> AppResult<Vec<QuotaCounter>> {
        sqlx::query_as::<_, QuotaCounter>(
            "SELECT * FROM quota_counters \
             WHERE exam_id = $1 AND department_id = $2 AND category = $3 \
               AND booked < capacity \
             ORDER BY day_index",
        )
        .bind(exam_id)
        .bind(department_id)
        .bind(category)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx("Failed to list open quota counters", e))
    }

    async fn find_active_booking(
        &mut self,
        student_id: StudentId,
        exam_id: ExamId,
    ) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE student_id = $1 AND exam_id = $2",
        )
        .bind(student_id)
        .bind(exam_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx("Failed to check existing booking", e))
    }

    async fn try_claim(&mut self, quota_id: QuotaId) -> AppResult<ClaimOutcome> {
        let claimed = sqlx::query_as::<_, QuotaCounter>(
            "UPDATE quota_counters SET booked = booked + 1 \
             WHERE id = $1 AND booked < capacity RETURNING *",
        )
        .bind(quota_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx("Failed to claim quota seat", e))?;

        if let Some(counter) = claimed {
            debug!(quota_id = %quota_id, booked = counter.booked(), "Quota seat claimed");
            return Ok(ClaimOutcome::Claimed(counter));
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM quota_counters WHERE id = $1)")
                .bind(quota_id)
                .fetch_one(&mut *self.tx)
                .await
                .map_err(|e| map_sqlx("Failed to check quota counter", e))?;
        if exists {
            Ok(ClaimOutcome::Exhausted)
        } else {
            Err(AppError::not_found(format!("Quota slot {quota_id} not found")))
        }
    }

    async fn insert_booking(&mut self, booking: &Booking) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings \
             (id, student_id, exam_id, quota_id, department_id, category, slot_date, booked_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(booking.id)
        .bind(booking.student_id)
        .bind(booking.exam_id)
        .bind(booking.quota_id)
        .bind(booking.department_id)
        .bind(booking.category)
        .bind(booking.slot_date)
        .bind(booking.booked_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx("Failed to insert booking", e))
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx("Failed to commit booking", e))
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx("Failed to roll back booking", e))
    }
}
