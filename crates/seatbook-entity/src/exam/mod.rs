//! Exam window entities.

pub mod demand;
pub mod status;
pub mod window;

pub use demand::DemandSpec;
pub use status::ExamStatus;
pub use window::ExamWindow;
