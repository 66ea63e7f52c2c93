//! # seatbook-entity
//!
//! Domain entity models for SeatBook. Every struct in this crate is either a
//! database row or a value object passed between the ledger and its callers.
//! Database rows additionally derive `sqlx::FromRow`.

pub mod booking;
pub mod department;
pub mod exam;
pub mod quota;
pub mod student;

pub use booking::Booking;
pub use department::Department;
pub use exam::{DemandSpec, ExamStatus, ExamWindow};
pub use quota::{AvailableSlot, QuotaCounter, QuotaKey};
pub use student::{Category, StudentProfile};
