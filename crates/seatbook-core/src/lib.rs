//! # seatbook-core
//!
//! Core crate for SeatBook. Contains configuration schemas, typed
//! identifiers, the cache provider trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other SeatBook crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
