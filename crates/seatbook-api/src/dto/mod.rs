//! Request and response DTOs.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;

use validator::Validate;

use seatbook_core::error::AppError;

/// Run `validator` rules on a request body.
pub fn validate_body<T: Validate>(body: &T) -> Result<(), AppError> {
    body.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}
