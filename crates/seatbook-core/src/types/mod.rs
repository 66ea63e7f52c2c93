//! Core type definitions used across the SeatBook workspace.

pub mod id;

pub use id::*;
