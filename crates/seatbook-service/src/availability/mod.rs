//! Read-side projection of the quota ledger.

pub mod cached;
pub mod view;

pub use cached::{AvailabilityCache, CachedAvailability};
pub use view::{AvailabilityView, ExamAvailability};
