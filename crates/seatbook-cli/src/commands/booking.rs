//! Booking commands.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use seatbook_api::dto::BookRequest;
use seatbook_core::error::AppError;
use seatbook_core::types::{DepartmentId, ExamId};
use seatbook_database::BookingFilter;
use seatbook_entity::Booking;

use crate::output::{self, OutputFormat};

/// Arguments for booking commands
#[derive(Debug, Args)]
pub struct BookingArgs {
    /// Booking subcommand
    #[command(subcommand)]
    pub command: BookingCommand,
}

/// Booking subcommands
#[derive(Debug, Subcommand)]
pub enum BookingCommand {
    /// Book a seat for a student
    Book {
        /// Roll number
        roll_no: String,
        /// Slot ID from an availability listing
        #[arg(long, conflicts_with = "exam")]
        slot: Option<Uuid>,
        /// Exam ID; books the earliest open day unless --day or --date is set
        #[arg(long)]
        exam: Option<Uuid>,
        /// Day index within the exam
        #[arg(long, requires = "exam", conflicts_with = "date")]
        day: Option<i32>,
        /// Preferred exam date (YYYY-MM-DD)
        #[arg(long, requires = "exam")]
        date: Option<NaiveDate>,
    },
    /// List bookings
    List {
        /// Only bookings of this student
        #[arg(short, long)]
        roll_no: Option<String>,
        /// Only bookings in this exam
        #[arg(short, long)]
        exam: Option<Uuid>,
        /// Only bookings of this department
        #[arg(short, long)]
        department: Option<Uuid>,
    },
}

/// Booking display row for table output
#[derive(Debug, Serialize, Tabled)]
struct BookingRow {
    /// Booking ID
    id: String,
    /// Exam ID
    exam: String,
    /// Slot ID
    slot: String,
    /// Date
    date: String,
    /// Category
    category: String,
    /// Booked at
    booked_at: String,
}

impl From<&Booking> for BookingRow {
    fn from(b: &Booking) -> Self {
        Self {
            id: b.id.to_string(),
            exam: b.exam_id.to_string(),
            slot: b.quota_id.to_string(),
            date: b.slot_date.to_string(),
            category: b.category.to_string(),
            booked_at: b.booked_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Execute booking commands
pub async fn execute(
    args: &BookingArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let state = super::connect(config_path).await?;

    match &args.command {
        BookingCommand::Book {
            roll_no,
            slot,
            exam,
            day,
            date,
        } => {
            let student = state.roster.get_student(roll_no).await?;
            let target = BookRequest {
                slot_id: *slot,
                exam_id: *exam,
                day_index: *day,
                preferred_date: *date,
            }
            .into_target(&student)?;

            let booking = state.bookings.attempt_booking(roll_no, &target).await?;
            output::print_success(&format!(
                "Booked {} for '{}' (booking {})",
                booking.slot_date, roll_no, booking.id
            ));
        }
        BookingCommand::List {
            roll_no,
            exam,
            department,
        } => {
            let bookings = match roll_no {
                Some(roll_no) => {
                    let mut bookings = state.bookings.bookings_for(roll_no).await?;
                    if let Some(exam) = exam {
                        bookings.retain(|b| b.exam_id == ExamId::from_uuid(*exam));
                    }
                    bookings
                }
                None => {
                    state
                        .exams
                        .list_bookings(&BookingFilter {
                            exam_id: exam.map(ExamId::from_uuid),
                            department_id: department.map(DepartmentId::from_uuid),
                            ..Default::default()
                        })
                        .await?
                }
            };
            let rows: Vec<BookingRow> = bookings.iter().map(BookingRow::from).collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
