//! Exam repository implementation.

use sqlx::PgPool;

use seatbook_core::result::AppResult;
use seatbook_core::types::ExamId;
use seatbook_entity::{ExamStatus, ExamWindow};

use crate::error::map_sqlx;

/// Repository for exam windows.
#[derive(Debug, Clone)]
pub struct ExamRepository {
    pool: PgPool,
}

impl ExamRepository {
    /// Create a new exam repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an exam by primary key.
    pub async fn find_by_id(&self, id: ExamId) -> AppResult<Option<ExamWindow>> {
        sqlx::query_as::<_, ExamWindow>("SELECT * FROM exams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx("Failed to find exam by id", e))
    }

    /// List all exams, most recent start date first.
    pub async fn find_all(&self) -> AppResult<Vec<ExamWindow>> {
        sqlx::query_as::<_, ExamWindow>("SELECT * FROM exams ORDER BY start_date DESC, name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx("Failed to list exams", e))
    }

    /// Set the status of an installed exam. Returns `None` when the exam does
    /// not exist or is still generating.
    pub async fn update_status(
        &self,
        id: ExamId,
        status: ExamStatus,
    ) -> AppResult<Option<ExamWindow>> {
        sqlx::query_as::<_, ExamWindow>(
            "UPDATE exams SET status = $2 \
             WHERE id = $1 AND status <> 'GENERATING' RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to update exam status", e))
    }
}
