//! Departments and students.

pub mod service;

pub use service::{NewStudent, RosterService};
