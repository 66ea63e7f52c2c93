//! Exam service: installs quota inventory and manages the booking window.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use seatbook_cache::keys;
use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_core::types::{DepartmentId, ExamId, QuotaId};
use seatbook_database::{BookingFilter, BookingStore, TeardownReport};
use seatbook_entity::{Booking, Category, DemandSpec, ExamStatus, ExamWindow, QuotaCounter};

use crate::availability::AvailabilityCache;
use crate::quota::{InventorySummary, QuotaLedger, QuotaPlanner};

/// Input for creating an exam with its quota inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExam {
    /// Display name.
    pub name: String,
    /// First exam day.
    pub start_date: NaiveDate,
    /// Number of exam days.
    pub day_count: i32,
    /// One entry per (department, category) pair.
    pub demands: Vec<DemandSpec>,
}

/// One row of an exam's quota table, as shown to administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRow {
    /// Slot id.
    pub quota_id: QuotaId,
    /// Day offset within the exam.
    pub day_index: i32,
    /// Calendar date of the day.
    pub slot_date: NaiveDate,
    /// Department the seats belong to.
    pub department_id: DepartmentId,
    /// Category the seats belong to.
    pub category: Category,
    /// Seats provisioned.
    pub capacity: i32,
    /// Seats claimed.
    pub booked: i32,
    /// Seats left.
    pub remaining: i32,
}

impl From<&QuotaCounter> for QuotaRow {
    fn from(counter: &QuotaCounter) -> Self {
        Self {
            quota_id: counter.id,
            day_index: counter.day_index,
            slot_date: counter.slot_date,
            department_id: counter.department_id,
            category: counter.category,
            capacity: counter.capacity(),
            booked: counter.booked(),
            remaining: counter.remaining(),
        }
    }
}

/// Exam administration service.
#[derive(Debug, Clone)]
pub struct ExamService {
    store: Arc<dyn BookingStore>,
    planner: QuotaPlanner,
    ledger: QuotaLedger,
    cache: Option<AvailabilityCache>,
}

impl ExamService {
    /// Create a new exam service.
    pub fn new(
        store: Arc<dyn BookingStore>,
        planner: QuotaPlanner,
        cache: Option<AvailabilityCache>,
    ) -> Self {
        Self {
            ledger: QuotaLedger::new(Arc::clone(&store)),
            store,
            planner,
            cache,
        }
    }

    /// Plan and install an exam's quota inventory.
    ///
    /// The exam becomes visible, already `Open`, only once every row is
    /// written; any invalid demand leaves nothing behind.
    pub async fn initialize_exam(&self, input: NewExam) -> AppResult<InventorySummary> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Exam name must not be empty"));
        }

        let window = ExamWindow::new(name, input.start_date, input.day_count);
        let plan = self.planner.plan(window, &input.demands)?;

        let departments: BTreeSet<DepartmentId> =
            input.demands.iter().map(|d| d.department_id).collect();
        for department_id in departments {
            if self.store.find_department(department_id).await?.is_none() {
                return Err(AppError::not_found(format!(
                    "Department {department_id} not found"
                )));
            }
        }

        let installed = self.store.install_plan(&plan.exam, &plan.counters).await?;
        let summary = InventorySummary::from_plan(&installed, &plan);

        info!(
            exam_id = %installed.id,
            name = %installed.name,
            days = installed.day_count,
            rows = summary.rows_created,
            seats = summary.total_seats,
            "Exam inventory installed"
        );

        if let Some(cache) = &self.cache {
            cache.invalidate_all().await;
        }
        Ok(summary)
    }

    /// Dry-run split of `total` seats over `day_count` days.
    pub fn preview(&self, day_count: i32, total: i64) -> AppResult<Vec<u32>> {
        QuotaPlanner::allocate(day_count, total)
    }

    /// All exams.
    pub async fn list_exams(&self) -> AppResult<Vec<ExamWindow>> {
        self.store.list_exams().await
    }

    /// One exam.
    pub async fn get_exam(&self, exam_id: ExamId) -> AppResult<ExamWindow> {
        self.store
            .find_exam(exam_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Exam {exam_id} not found")))
    }

    /// The exam's quota table ordered by day, then department and category.
    pub async fn list_quotas(&self, exam_id: ExamId) -> AppResult<Vec<QuotaRow>> {
        self.get_exam(exam_id).await?;

        let key = keys::exam_quotas(exam_id);
        if let Some(cache) = &self.cache {
            match cache.manager().get_json::<Vec<QuotaRow>>(&key).await {
                Ok(Some(rows)) => return Ok(rows),
                Ok(None) => {}
                Err(e) => warn!(exam_id = %exam_id, error = %e, "Quota table cache read failed"),
            }
        }

        let mut rows: Vec<QuotaRow> = self
            .ledger
            .counters(exam_id)
            .await?
            .iter()
            .map(QuotaRow::from)
            .collect();
        rows.sort_by(|a, b| {
            a.day_index
                .cmp(&b.day_index)
                .then_with(|| a.department_id.cmp(&b.department_id))
                .then_with(|| a.category.code().cmp(&b.category.code()))
        });

        if let Some(cache) = &self.cache
            && let Err(e) = cache.manager().set_json(&key, &rows, cache.ttl()).await
        {
            warn!(exam_id = %exam_id, error = %e, "Quota table cache write failed");
        }
        Ok(rows)
    }

    /// Remove an exam with all its counters and bookings.
    pub async fn delete_exam(&self, exam_id: ExamId) -> AppResult<TeardownReport> {
        let report = self.store.teardown_exam(exam_id).await?;
        info!(
            exam_id = %exam_id,
            counters = report.counters_removed,
            bookings = report.bookings_removed,
            "Exam removed"
        );
        if let Some(cache) = &self.cache {
            cache.invalidate_exam(exam_id).await;
            cache.invalidate_all().await;
        }
        Ok(report)
    }

    /// Open or close the booking window.
    pub async fn set_booking_open(&self, exam_id: ExamId, open: bool) -> AppResult<ExamWindow> {
        let status = if open {
            ExamStatus::Open
        } else {
            ExamStatus::Closed
        };
        let exam = self.store.set_exam_status(exam_id, status).await?;
        info!(exam_id = %exam_id, status = %exam.status, "Exam status changed");
        if let Some(cache) = &self.cache {
            cache.invalidate_all().await;
        }
        Ok(exam)
    }

    /// Give one seat back to a slot. Bookings are left untouched.
    pub async fn release_seat(&self, quota_id: QuotaId) -> AppResult<QuotaCounter> {
        let counter = self.ledger.release(quota_id).await?;
        if let Some(cache) = &self.cache {
            cache
                .invalidate_partition(counter.department_id, counter.category, counter.exam_id)
                .await;
        }
        Ok(counter)
    }

    /// Committed bookings matching `filter`.
    pub async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>> {
        self.store.list_bookings(filter).await
    }
}
