//! Booking ledger configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which store owns the quota counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// PostgreSQL through sqlx.
    Postgres,
    /// Process-local store, for tests and single-node demos.
    Memory,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres => write!(f, "postgres"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("Unknown booking backend: {other}")),
        }
    }
}

/// Settings for the quota ledger and the booking path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Store backend.
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
    /// Upper bound on waiting for a quota lock, in milliseconds.
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_ms: u64,
    /// TTL of cached availability listings, in seconds. `0` disables caching.
    #[serde(default = "default_availability_ttl")]
    pub availability_cache_ttl_seconds: u64,
    /// Largest demand accepted for one department/category pair.
    #[serde(default = "default_max_demand")]
    pub max_demand_per_pair: i64,
}

impl BookingConfig {
    /// Lock timeout as a [`Duration`].
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Availability cache TTL as a [`Duration`].
    pub fn availability_ttl(&self) -> Duration {
        Duration::from_secs(self.availability_cache_ttl_seconds)
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            lock_timeout_ms: default_lock_timeout(),
            availability_cache_ttl_seconds: default_availability_ttl(),
            max_demand_per_pair: default_max_demand(),
        }
    }
}

fn default_backend() -> StoreBackend {
    StoreBackend::Memory
}

fn default_lock_timeout() -> u64 {
    2000
}

fn default_availability_ttl() -> u64 {
    10
}

fn default_max_demand() -> i64 {
    100_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("Postgres".parse::<StoreBackend>(), Ok(StoreBackend::Postgres));
        assert_eq!("memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("mongo".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_durations() {
        let cfg = BookingConfig::default();
        assert_eq!(cfg.lock_timeout(), Duration::from_millis(2000));
        assert_eq!(cfg.availability_ttl(), Duration::from_secs(10));
    }
}
