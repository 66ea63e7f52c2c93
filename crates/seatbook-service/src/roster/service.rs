//! Roster service: reference data students book against.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_database::BookingStore;
use seatbook_entity::{Category, Department, StudentProfile};

/// Input for registering a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudent {
    /// Unique roll number.
    pub roll_no: String,
    /// Full name.
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Code of the owning department.
    pub department_code: String,
    /// Residential category.
    pub category: Category,
}

/// Department and student registration.
#[derive(Debug, Clone)]
pub struct RosterService {
    store: Arc<dyn BookingStore>,
}

impl RosterService {
    /// Create a new roster service.
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Register a department. Codes are unique, case-insensitively.
    pub async fn create_department(&self, code: &str, name: &str) -> AppResult<Department> {
        if code.trim().is_empty() {
            return Err(AppError::validation("Department code must not be empty"));
        }
        if name.trim().is_empty() {
            return Err(AppError::validation("Department name must not be empty"));
        }

        let department = Department::new(code, name.trim());
        if self
            .store
            .find_department_by_code(&department.code)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "Department '{}' already exists",
                department.code
            )));
        }

        let created = self.store.insert_department(&department).await?;
        info!(department_id = %created.id, code = %created.code, "Department created");
        Ok(created)
    }

    /// All departments.
    pub async fn list_departments(&self) -> AppResult<Vec<Department>> {
        self.store.list_departments().await
    }

    /// Look up a department by code.
    pub async fn department_by_code(&self, code: &str) -> AppResult<Department> {
        let code = code.trim().to_uppercase();
        self.store
            .find_department_by_code(&code)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Department '{code}' not found")))
    }

    /// Register a student under an existing department.
    pub async fn register_student(&self, input: NewStudent) -> AppResult<StudentProfile> {
        let roll_no = input.roll_no.trim();
        if roll_no.is_empty() {
            return Err(AppError::validation("Roll number must not be empty"));
        }
        if input.name.trim().is_empty() {
            return Err(AppError::validation("Student name must not be empty"));
        }

        let department = self.department_by_code(&input.department_code).await?;
        if self.store.find_student(roll_no).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Student '{roll_no}' already exists"
            )));
        }

        let email = input
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        let student = StudentProfile::new(
            roll_no,
            input.name.trim(),
            email,
            department.id,
            input.category,
        );
        let created = self.store.insert_student(&student).await?;
        info!(
            roll_no = %created.roll_no,
            department = %department.code,
            category = %created.category,
            "Student registered"
        );
        Ok(created)
    }

    /// Look up a student by roll number.
    pub async fn get_student(&self, roll_no: &str) -> AppResult<StudentProfile> {
        self.store
            .find_student(roll_no.trim())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Student '{roll_no}' not found")))
    }

    /// Students, optionally restricted to one department code.
    pub async fn list_students(&self, department_code: Option<&str>) -> AppResult<Vec<StudentProfile>> {
        let department_id = match department_code {
            Some(code) => Some(self.department_by_code(code).await?.id),
            None => None,
        };
        self.store.list_students(department_id).await
    }
}
