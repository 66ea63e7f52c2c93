//! Student domain entities.

pub mod category;
pub mod profile;

pub use category::Category;
pub use profile::StudentProfile;
