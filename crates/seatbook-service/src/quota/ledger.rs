//! The quota ledger: the only path that changes a counter's `booked` value.

use std::sync::Arc;

use tracing::{info, warn};

use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_core::types::{ExamId, QuotaId};
use seatbook_database::{BookingStore, BookingUnit, ClaimOutcome};
use seatbook_entity::{QuotaCounter, QuotaKey};

/// Atomic claim/release over quota counters.
///
/// A claim is scoped to exactly one slot and only blocks other claims on
/// that slot. Counters returned from here are snapshots.
#[derive(Debug, Clone)]
pub struct QuotaLedger {
    store: Arc<dyn BookingStore>,
}

impl QuotaLedger {
    /// Create a ledger over `store`.
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Claim one seat from `quota_id` inside `unit`.
    ///
    /// The claim becomes durable only when the unit commits.
    pub async fn try_claim(
        &self,
        unit: &mut dyn BookingUnit,
        quota_id: QuotaId,
    ) -> AppResult<ClaimOutcome> {
        let outcome = unit.try_claim(quota_id).await.inspect_err(|e| {
            if e.is_retryable() {
                warn!(quota_id = %quota_id, "Quota lock not acquired in time");
            }
        })?;
        if outcome == ClaimOutcome::Exhausted {
            info!(quota_id = %quota_id, "Quota exhausted");
        }
        Ok(outcome)
    }

    /// Give one seat back to `quota_id`. Never drops below zero.
    ///
    /// Admin correction only; the booking path never releases.
    pub async fn release(&self, quota_id: QuotaId) -> AppResult<QuotaCounter> {
        let counter = self.store.release(quota_id).await?;
        info!(
            quota_id = %quota_id,
            booked = counter.booked(),
            capacity = counter.capacity(),
            "Quota seat released"
        );
        Ok(counter)
    }

    /// Seats left on `quota_id`, read directly from the store.
    pub async fn remaining(&self, quota_id: QuotaId) -> AppResult<i32> {
        Ok(self.counter(quota_id).await?.remaining())
    }

    /// Seats left on the counter addressed by `key`.
    pub async fn remaining_by_key(&self, key: &QuotaKey) -> AppResult<i32> {
        self.store
            .find_counter_by_key(key)
            .await?
            .map(|c| c.remaining())
            .ok_or_else(|| AppError::not_found(format!("Quota {key} not found")))
    }

    /// Snapshot of one counter.
    pub async fn counter(&self, quota_id: QuotaId) -> AppResult<QuotaCounter> {
        self.store
            .find_counter(quota_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Quota slot {quota_id} not found")))
    }

    /// Snapshots of every counter of an exam.
    pub async fn counters(&self, exam_id: ExamId) -> AppResult<Vec<QuotaCounter>> {
        self.store.list_counters(exam_id).await
    }
}
