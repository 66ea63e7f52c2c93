//! Route handlers organized by domain.

pub mod admin;
pub mod health;
pub mod student;

use serde::Serialize;

/// Wrap `data` in the standard success envelope.
pub(crate) fn ok<T: Serialize>(data: T) -> serde_json::Value {
    serde_json::json!({ "success": true, "data": data })
}
