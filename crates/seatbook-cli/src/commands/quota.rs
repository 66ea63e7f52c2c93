//! Quota correction commands.

use clap::{Args, Subcommand};
use uuid::Uuid;

use seatbook_core::error::AppError;
use seatbook_core::types::QuotaId;
use seatbook_service::QuotaRow;

use crate::output::{self, OutputFormat};

/// Arguments for quota commands
#[derive(Debug, Args)]
pub struct QuotaArgs {
    /// Quota subcommand
    #[command(subcommand)]
    pub command: QuotaCommand,
}

/// Quota subcommands
#[derive(Debug, Subcommand)]
pub enum QuotaCommand {
    /// Give one seat back to a slot; bookings are not touched
    Release {
        /// Slot ID
        id: Uuid,
    },
}

/// Execute quota commands
pub async fn execute(
    args: &QuotaArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let state = super::connect(config_path).await?;

    match &args.command {
        QuotaCommand::Release { id } => {
            let counter = state.exams.release_seat(QuotaId::from_uuid(*id)).await?;
            let row = QuotaRow::from(&counter);
            output::print_item(
                &row,
                &[
                    ("Slot", row.quota_id.to_string()),
                    ("Date", row.slot_date.to_string()),
                    ("Booked", row.booked.to_string()),
                    ("Remaining", row.remaining.to_string()),
                ],
                format,
            );
        }
    }

    Ok(())
}
