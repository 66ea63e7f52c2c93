//! Pool-backed repositories for SeatBook tables.
//!
//! These cover reads and administrative writes that do not participate in a
//! booking unit. The booking path itself runs through
//! [`crate::store::postgres::PgBookingUnit`].

pub mod booking;
pub mod department;
pub mod exam;
pub mod quota;
pub mod student;

pub use booking::BookingRepository;
pub use department::DepartmentRepository;
pub use exam::ExamRepository;
pub use quota::QuotaRepository;
pub use student::StudentRepository;
