//! # seatbook-database
//!
//! PostgreSQL connection management, reference-data repositories, and the
//! [`BookingStore`](store::BookingStore) seam that owns the quota ledger,
//! with PostgreSQL and in-process backends.

pub mod connection;
pub mod error;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{
    BookingFilter, BookingStore, BookingUnit, ClaimOutcome, MemoryBookingStore, PgBookingStore,
    TeardownReport,
};
