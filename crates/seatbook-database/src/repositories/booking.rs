//! Booking read repository.

use sqlx::{PgPool, Postgres, QueryBuilder};

use seatbook_core::result::AppResult;
use seatbook_entity::Booking;

use crate::error::map_sqlx;
use crate::store::BookingFilter;

/// Read access to committed bookings. Inserts happen only inside a booking
/// unit.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    /// Create a new booking repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List bookings matching every set field of `filter`, oldest first.
    pub async fn find_filtered(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>> {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT * FROM bookings WHERE TRUE");
        if let Some(exam_id) = filter.exam_id {
            query.push(" AND exam_id = ").push_bind(exam_id);
        }
        if let Some(quota_id) = filter.quota_id {
            query.push(" AND quota_id = ").push_bind(quota_id);
        }
        if let Some(department_id) = filter.department_id {
            query.push(" AND department_id = ").push_bind(department_id);
        }
        if let Some(student_id) = filter.student_id {
            query.push(" AND student_id = ").push_bind(student_id);
        }
        query.push(" ORDER BY booked_at, id");

        query
            .build_query_as::<Booking>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx("Failed to list bookings", e))
    }
}
