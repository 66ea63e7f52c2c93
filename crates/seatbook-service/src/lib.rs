//! # seatbook-service
//!
//! Business logic for SeatBook. The quota planner splits aggregate demand
//! into per-day capacity; the ledger owns the booked counters; the booking
//! coordinator runs one student's attempt as a single unit of work; the
//! availability view projects the ledger for reads.
//!
//! Services take their dependencies at construction time as `Arc`s.

pub mod availability;
pub mod booking;
pub mod exam;
pub mod quota;
pub mod roster;

pub use availability::{AvailabilityCache, AvailabilityView, CachedAvailability, ExamAvailability};
pub use booking::{BookingCoordinator, BookingTarget, QuotaResolver};
pub use exam::{ExamService, NewExam, QuotaRow};
pub use quota::{DayAllocation, InventorySummary, QuotaLedger, QuotaPlan, QuotaPlanner};
pub use roster::{NewStudent, RosterService};
