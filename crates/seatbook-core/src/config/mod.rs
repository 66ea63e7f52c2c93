//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod booking;
pub mod cache;
pub mod database;
pub mod logging;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::booking::{BookingConfig, StoreBackend};
pub use self::cache::{CacheConfig, MemoryCacheConfig, RedisCacheConfig};
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Deserialization target for `config/default.toml`, the environment
/// overlay, and `SEATBOOK__*` environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache provider settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Booking ledger settings.
    #[serde(default)]
    pub booking: BookingConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default`, `config/{env}` and environment variables
    /// prefixed with `SEATBOOK__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", &format!("config/{env}"))
    }

    /// Load configuration from an explicit base file plus an overlay file.
    pub fn load_from(base: &str, overlay: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(overlay).required(false))
            .add_source(
                config::Environment::with_prefix("SEATBOOK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject settings that would make the booking path misbehave.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.booking.lock_timeout_ms == 0 {
            return Err(AppError::configuration(
                "booking.lock_timeout_ms must be greater than zero",
            ));
        }
        if self.booking.backend == StoreBackend::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required for the postgres booking backend",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_memory_backend() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.booking.backend, StoreBackend::Memory);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_lock_timeout_rejected() {
        let mut cfg = AppConfig::default();
        cfg.booking.lock_timeout_ms = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_postgres_requires_url() {
        let mut cfg = AppConfig::default();
        cfg.booking.backend = StoreBackend::Postgres;
        cfg.database.url.clear();
        assert!(cfg.validate().is_err());
    }
}
