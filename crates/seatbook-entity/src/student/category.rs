//! Student category enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Residential category of a student. Quotas are partitioned by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "student_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Day scholar.
    Day,
    /// Male hostel resident.
    HostelMale,
    /// Female hostel resident.
    HostelFemale,
}

impl Category {
    /// All categories in code order.
    pub const ALL: [Category; 3] = [Self::Day, Self::HostelMale, Self::HostelFemale];

    /// Numeric code used by roster exports (1 = day, 2 = hostel male, 3 = hostel female).
    pub fn code(&self) -> u8 {
        match self {
            Self::Day => 1,
            Self::HostelMale => 2,
            Self::HostelFemale => 3,
        }
    }

    /// Resolve a numeric roster code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Day),
            2 => Some(Self::HostelMale),
            3 => Some(Self::HostelFemale),
            _ => None,
        }
    }

    /// Return the category as its stored string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "DAY",
            Self::HostelMale => "HOSTEL_MALE",
            Self::HostelFemale => "HOSTEL_FEMALE",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = seatbook_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_uppercase().replace(['-', ' '], "_");
        match normalised.as_str() {
            "DAY" | "1" => Ok(Self::Day),
            "HOSTEL_MALE" | "HOSTELM" | "HOSTEL_M" | "2" => Ok(Self::HostelMale),
            "HOSTEL_FEMALE" | "HOSTELF" | "HOSTEL_F" | "3" => Ok(Self::HostelFemale),
            _ => Err(seatbook_core::AppError::validation(format!(
                "Invalid category: '{s}'. Expected one of: DAY, HOSTEL_MALE, HOSTEL_FEMALE"
            ))),
        }
    }
}
