//! Core traits defined in `seatbook-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
