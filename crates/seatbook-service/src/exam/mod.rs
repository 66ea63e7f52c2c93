//! Exam administration: inventory generation, lifecycle and corrections.

pub mod service;

pub use service::{ExamService, NewExam, QuotaRow};
