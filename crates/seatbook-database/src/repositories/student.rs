//! Student repository implementation.

use sqlx::PgPool;

use seatbook_core::result::AppResult;
use seatbook_core::types::DepartmentId;
use seatbook_entity::StudentProfile;

use crate::error::map_sqlx;

/// Repository for student profiles.
#[derive(Debug, Clone)]
pub struct StudentRepository {
    pool: PgPool,
}

impl StudentRepository {
    /// Create a new student repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a student. A duplicate roll number fails with `Conflict`, an
    /// unknown department with `NotFound`.
    pub async fn create(&self, student: &StudentProfile) -> AppResult<StudentProfile> {
        sqlx::query_as::<_, StudentProfile>(
            "INSERT INTO students (id, roll_no, name, email, department_id, category, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(student.id)
        .bind(&student.roll_no)
        .bind(&student.name)
        .bind(&student.email)
        .bind(student.department_id)
        .bind(student.category)
        .bind(student.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to create student", e))
    }

    /// Find a student by roll number.
    pub async fn find_by_roll_no(&self, roll_no: &str) -> AppResult<Option<StudentProfile>> {
        sqlx::query_as::<_, StudentProfile>("SELECT * FROM students WHERE roll_no = $1")
            .bind(roll_no.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx("Failed to find student by roll number", e))
    }

    /// List students, optionally restricted to one department.
    pub async fn find_all(&self, department_id: Option<DepartmentId>) -> AppResult<Vec<StudentProfile>> {
        sqlx::query_as::<_, StudentProfile>(
            "SELECT * FROM students \
             WHERE ($1::uuid IS NULL OR department_id = $1) \
             ORDER BY roll_no",
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to list students", e))
    }
}
