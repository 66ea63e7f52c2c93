//! Booking coordination.

pub mod coordinator;
pub mod target;

pub use coordinator::BookingCoordinator;
pub use target::{BookingTarget, QuotaResolver};
