//! Admin handlers.

pub mod bookings;
pub mod departments;
pub mod exams;
pub mod quotas;
pub mod students;
