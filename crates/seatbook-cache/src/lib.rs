//! # seatbook-cache
//!
//! Cache providers for SeatBook read paths. Supports two modes:
//!
//! - **memory**: in-process cache using [moka](https://crates.io/crates/moka)
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime from configuration. The quota ledger
//! never reads from here; only availability listings do.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
