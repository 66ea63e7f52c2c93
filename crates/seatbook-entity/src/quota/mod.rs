//! Quota ledger rows and read models.

pub mod available;
pub mod counter;
pub mod key;

pub use available::AvailableSlot;
pub use counter::QuotaCounter;
pub use key::QuotaKey;
