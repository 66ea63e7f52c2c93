//! Department repository implementation.

use sqlx::PgPool;

use seatbook_core::result::AppResult;
use seatbook_core::types::DepartmentId;
use seatbook_entity::Department;

use crate::error::map_sqlx;

/// Repository for department reference data.
#[derive(Debug, Clone)]
pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    /// Create a new department repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a department. A duplicate code fails with `Conflict`.
    pub async fn create(&self, department: &Department) -> AppResult<Department> {
        sqlx::query_as::<_, Department>(
            "INSERT INTO departments (id, code, name, created_at) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(department.id)
        .bind(&department.code)
        .bind(&department.name)
        .bind(department.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx("Failed to create department", e))
    }

    /// Find a department by primary key.
    pub async fn find_by_id(&self, id: DepartmentId) -> AppResult<Option<Department>> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx("Failed to find department by id", e))
    }

    /// Find a department by code (case-insensitive).
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<Department>> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE UPPER(code) = UPPER($1)")
            .bind(code.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx("Failed to find department by code", e))
    }

    /// List all departments ordered by code.
    pub async fn find_all(&self) -> AppResult<Vec<Department>> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY code")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx("Failed to list departments", e))
    }
}
