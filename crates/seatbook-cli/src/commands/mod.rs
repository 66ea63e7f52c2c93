//! CLI command definitions and dispatch.

pub mod booking;
pub mod department;
pub mod exam;
pub mod migrate;
pub mod quota;
pub mod student;

use clap::{Parser, Subcommand};

use seatbook_api::AppState;
use seatbook_core::config::{AppConfig, StoreBackend};
use seatbook_core::error::AppError;

use crate::output::{self, OutputFormat};

/// SeatBook: exam seat quota allocation and booking
#[derive(Debug, Parser)]
#[command(name = "seatbook", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Department management
    Department(department::DepartmentArgs),
    /// Student management
    Student(student::StudentArgs),
    /// Exam inventory and lifecycle
    Exam(exam::ExamArgs),
    /// Bookings
    Booking(booking::BookingArgs),
    /// Quota corrections
    Quota(quota::QuotaArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::Department(args) => department::execute(args, &self.config, self.format).await,
            Commands::Student(args) => student::execute(args, &self.config, self.format).await,
            Commands::Exam(args) => exam::execute(args, &self.config, self.format).await,
            Commands::Booking(args) => booking::execute(args, &self.config, self.format).await,
            Commands::Quota(args) => quota::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file, overlaid with `config/$SEATBOOK_ENV`
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    let env = std::env::var("SEATBOOK_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load_from(config_path, &format!("config/{env}"))
}

/// Helper: load configuration and wire the services
pub async fn connect(config_path: &str) -> Result<AppState, AppError> {
    let config = load_config(config_path)?;
    if config.booking.backend == StoreBackend::Memory {
        output::print_warning("Using the memory backend; nothing persists after this command.");
    }
    seatbook_api::build_state(config).await
}
