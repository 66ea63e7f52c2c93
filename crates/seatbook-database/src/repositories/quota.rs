//! Quota counter read repository.

use sqlx::PgPool;

use seatbook_core::result::AppResult;
use seatbook_core::types::{DepartmentId, ExamId, QuotaId};
use seatbook_entity::{AvailableSlot, Category, QuotaCounter, QuotaKey};

use crate::error::map_sqlx;

/// Read access to the quota ledger. Mutations go through a booking unit or
/// [`crate::store::PgBookingStore::release`].
#[derive(Debug, Clone)]
pub struct QuotaRepository {
    pool: PgPool,
}

impl QuotaRepository {
    /// Create a new quota repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a counter by slot id.
    pub async fn find_by_id(&self, id: QuotaId) -> AppResult<Option<QuotaCounter>> {
        sqlx::query_as::<_, QuotaCounter>("SELECT * FROM quota_counters WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx("Failed to find quota counter", e))
    }

    /// Find a counter by its composite key.
    pub async fn find_by_key(&self, key: &QuotaKey) -> AppResult<Option<QuotaCounter>> {
        sqlx::query_as::<_, QuotaCounter>(
            "SELECT * FROM quota_counters \
             WHERE exam_id = $1 AND day_index = $2 AND department_id = $3 AND category = $4",
        )
        .bind(key.exam_id)
        .bind(key.day_index)
        .bind(key.department_id)
        .bind(key.category)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to find quota counter by key", e))
    }

    /// All counters of an exam, ordered by day then partition.
    pub async fn find_by_exam(&self, exam_id: ExamId) -> AppResult<Vec<QuotaCounter>> {
        sqlx::query_as::<_, QuotaCounter>(
            "SELECT * FROM quota_counters WHERE exam_id = $1 \
             ORDER BY day_index, department_id, category",
        )
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to list quota counters", e))
    }

    /// Open slots with room left for one partition, in a single statement.
    pub async fn find_available(
        &self,
        department_id: DepartmentId,
        category: Category,
    ) -> AppResult<Vec<AvailableSlot>> {
        sqlx::query_as::<_, AvailableSlot>(
            "SELECT q.id AS quota_id, q.exam_id, e.name AS exam_name, q.day_index, \
                    q.slot_date, q.category, (q.capacity - q.booked) AS remaining \
             FROM quota_counters q \
             JOIN exams e ON e.id = q.exam_id \
             WHERE q.department_id = $1 AND q.category = $2 \
               AND e.status = 'OPEN' AND q.booked < q.capacity \
             ORDER BY q.slot_date, e.name, q.day_index",
        )
        .bind(department_id)
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to list available slots", e))
    }
}
