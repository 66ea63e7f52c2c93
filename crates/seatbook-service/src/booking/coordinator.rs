//! Runs one student's booking attempt as a single unit of work.
//!
//! Steps, all inside one [`BookingUnit`]:
//! 1. resolve the student (`NotFound`);
//! 2. resolve the target to its candidate counters and check they belong to
//!    the student's department/category (`ProfileMismatch`) and that their
//!    exam is open (`BookingClosed`);
//! 3. reject a second booking in the same exam (`AlreadyBooked`);
//! 4. claim one seat from the first candidate with room, one slot lock at a
//!    time (`QuotaExhausted` once every candidate is full);
//! 5. insert the booking and commit.
//!
//! Any failure rolls the unit back, so a claimed seat always has a booking.
//! Cache invalidation happens after commit, outside the locked section.

use std::sync::Arc;

use tracing::{info, warn};

use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_database::{BookingFilter, BookingStore, BookingUnit, ClaimOutcome};
use seatbook_entity::Booking;

use super::target::QuotaResolver;
use crate::availability::AvailabilityCache;
use crate::quota::QuotaLedger;

/// Orchestrates booking attempts.
#[derive(Debug, Clone)]
pub struct BookingCoordinator {
    store: Arc<dyn BookingStore>,
    ledger: QuotaLedger,
    cache: Option<AvailabilityCache>,
}

impl BookingCoordinator {
    /// Create a coordinator without read-cache invalidation.
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self {
            ledger: QuotaLedger::new(Arc::clone(&store)),
            store,
            cache: None,
        }
    }

    /// Invalidate `cache` after every committed booking.
    pub fn with_cache(mut self, cache: AvailabilityCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Book a seat for `roll_no` on whatever `target` resolves to.
    ///
    /// A `TransientLockTimeout` leaves nothing behind and may be retried with
    /// the same request; if the original attempt did commit, the retry
    /// returns `AlreadyBooked`.
    pub async fn attempt_booking(
        &self,
        roll_no: &str,
        target: &(dyn QuotaResolver + '_),
    ) -> AppResult<Booking> {
        let mut unit = self.store.begin().await?;

        let booking = match self.run_steps(unit.as_mut(), roll_no, target).await {
            Ok(booking) => booking,
            Err(err) => {
                if let Err(rollback_err) = unit.rollback().await {
                    warn!(roll_no, error = %rollback_err, "Booking rollback failed");
                }
                info!(roll_no, outcome = %err.kind, reason = %err.message, "Booking rejected");
                return Err(err);
            }
        };

        unit.commit().await.inspect_err(|e| {
            warn!(roll_no, error = %e, "Booking commit failed");
        })?;

        info!(
            roll_no,
            booking_id = %booking.id,
            quota_id = %booking.quota_id,
            exam_id = %booking.exam_id,
            slot_date = %booking.slot_date,
            "Booking committed"
        );

        if let Some(cache) = &self.cache {
            cache
                .invalidate_partition(booking.department_id, booking.category, booking.exam_id)
                .await;
        }

        Ok(booking)
    }

    async fn run_steps(
        &self,
        unit: &mut dyn BookingUnit,
        roll_no: &str,
        target: &(dyn QuotaResolver + '_),
    ) -> AppResult<Booking> {
        let student = unit
            .find_student(roll_no)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Student '{roll_no}' not found")))?;

        let candidates = target.resolve(unit, &student).await?;
        let Some(first) = candidates.first() else {
            return Err(AppError::quota_exhausted("No quota slot matches the request"));
        };
        if let Some(foreign) = candidates
            .iter()
            .find(|c| !student.matches(c.department_id, c.category))
        {
            return Err(AppError::profile_mismatch(format!(
                "Slot {} is reserved for another department or category",
                foreign.id
            )));
        }

        let exam = unit
            .find_exam(first.exam_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Exam {} not found", first.exam_id)))?;
        if !exam.is_open() {
            return Err(AppError::booking_closed(format!(
                "Exam '{}' is not open for booking",
                exam.name
            )));
        }

        if let Some(existing) = unit.find_active_booking(student.id, exam.id).await? {
            return Err(AppError::already_booked(format!(
                "Student '{roll_no}' already booked {} in exam '{}'",
                existing.slot_date, exam.name
            )));
        }

        let mut claimed = None;
        for counter in &candidates {
            if let ClaimOutcome::Claimed(next) = self.ledger.try_claim(unit, counter.id).await? {
                claimed = Some(next);
                break;
            }
        }
        let Some(claimed) = claimed else {
            return Err(match candidates.as_slice() {
                [only] => AppError::quota_exhausted(format!(
                    "No seats left on {} for this slot",
                    only.slot_date
                )),
                _ => AppError::quota_exhausted(format!(
                    "No seats left on any day of exam '{}'",
                    exam.name
                )),
            });
        };

        unit.insert_booking(&Booking::for_claim(student.id, &claimed))
            .await
    }

    /// Bookings held by `roll_no`, oldest first.
    pub async fn bookings_for(&self, roll_no: &str) -> AppResult<Vec<Booking>> {
        let student = self
            .store
            .find_student(roll_no)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Student '{roll_no}' not found")))?;
        self.store
            .list_bookings(&BookingFilter {
                student_id: Some(student.id),
                ..Default::default()
            })
            .await
    }
}
