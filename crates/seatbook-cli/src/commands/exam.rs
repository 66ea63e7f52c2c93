//! Exam inventory and lifecycle commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use seatbook_api::dto::CreateExamRequest;
use seatbook_api::dto::validate_body;
use seatbook_core::error::AppError;
use seatbook_core::types::ExamId;
use seatbook_entity::{Category, DemandSpec, ExamWindow};
use seatbook_service::{NewExam, QuotaPlanner, QuotaRow};

use crate::output::{self, OutputFormat};

/// Arguments for exam commands
#[derive(Debug, Args)]
pub struct ExamArgs {
    /// Exam subcommand
    #[command(subcommand)]
    pub command: ExamCommand,
}

/// Exam subcommands
#[derive(Debug, Subcommand)]
pub enum ExamCommand {
    /// Preview how a total is split over days, without writing anything
    Plan {
        /// Number of exam days
        #[arg(long)]
        days: i32,
        /// Total seats
        #[arg(long)]
        total: i64,
    },
    /// Create an exam and its quota inventory from a JSON file
    Init {
        /// JSON file: name, start_date, day_count, demands[]
        #[arg(short = 'i', long)]
        file: PathBuf,
    },
    /// List exams
    List,
    /// Show the quota table of an exam
    Quotas {
        /// Exam ID
        id: Uuid,
    },
    /// Open an exam for booking
    Open {
        /// Exam ID
        id: Uuid,
    },
    /// Close an exam for booking
    Close {
        /// Exam ID
        id: Uuid,
    },
    /// Delete an exam with all its quotas and bookings
    Delete {
        /// Exam ID
        id: Uuid,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// Exam display row for table output
#[derive(Debug, Serialize, Tabled)]
struct ExamRow {
    /// Exam ID
    id: String,
    /// Name
    name: String,
    /// First day
    start: String,
    /// Days
    days: i32,
    /// Status
    status: String,
}

impl From<&ExamWindow> for ExamRow {
    fn from(e: &ExamWindow) -> Self {
        Self {
            id: e.id.to_string(),
            name: e.name.clone(),
            start: e.start_date.to_string(),
            days: e.day_count,
            status: e.status.to_string(),
        }
    }
}

/// Quota display row for table output
#[derive(Debug, Serialize, Tabled)]
struct QuotaTableRow {
    /// Slot ID
    slot: String,
    /// Day
    day: i32,
    /// Date
    date: String,
    /// Department ID
    department: String,
    /// Category
    category: Category,
    /// Capacity
    capacity: i32,
    /// Booked
    booked: i32,
    /// Remaining
    remaining: i32,
}

impl From<&QuotaRow> for QuotaTableRow {
    fn from(q: &QuotaRow) -> Self {
        Self {
            slot: q.quota_id.to_string(),
            day: q.day_index,
            date: q.slot_date.to_string(),
            department: q.department_id.to_string(),
            category: q.category,
            capacity: q.capacity,
            booked: q.booked,
            remaining: q.remaining,
        }
    }
}

/// Per-day preview row
#[derive(Debug, Serialize, Tabled)]
struct PlanRow {
    /// Day index
    day: usize,
    /// Seats
    seats: u32,
}

/// Execute exam commands
pub async fn execute(
    args: &ExamArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    if let ExamCommand::Plan { days, total } = &args.command {
        let split = QuotaPlanner::allocate(*days, *total)?;
        let rows: Vec<PlanRow> = split
            .into_iter()
            .enumerate()
            .map(|(day, seats)| PlanRow { day, seats })
            .collect();
        output::print_list(&rows, format);
        return Ok(());
    }

    let state = super::connect(config_path).await?;

    match &args.command {
        ExamCommand::Plan { .. } => {}
        ExamCommand::Init { file } => {
            let raw = std::fs::read_to_string(file)?;
            let req: CreateExamRequest = serde_json::from_str(&raw)?;
            validate_body(&req)?;

            let mut demands = Vec::with_capacity(req.demands.len());
            for demand in &req.demands {
                let department = state.roster.department_by_code(&demand.department_code).await?;
                let category: Category = demand.category.parse()?;
                demands.push(DemandSpec::new(department.id, category, demand.total));
            }

            let summary = state
                .exams
                .initialize_exam(NewExam {
                    name: req.name,
                    start_date: req.start_date,
                    day_count: req.day_count,
                    demands,
                })
                .await?;
            output::print_item(
                &summary,
                &[
                    ("Exam", summary.exam_id.to_string()),
                    ("Name", summary.name.clone()),
                    ("Start", summary.start_date.to_string()),
                    ("Days", summary.day_count.to_string()),
                    ("Rows created", summary.rows_created.to_string()),
                    ("Total seats", summary.total_seats.to_string()),
                ],
                format,
            );
        }
        ExamCommand::List => {
            let exams = state.exams.list_exams().await?;
            let rows: Vec<ExamRow> = exams.iter().map(ExamRow::from).collect();
            output::print_list(&rows, format);
        }
        ExamCommand::Quotas { id } => {
            let quotas = state.exams.list_quotas(ExamId::from_uuid(*id)).await?;
            let rows: Vec<QuotaTableRow> = quotas.iter().map(QuotaTableRow::from).collect();
            output::print_list(&rows, format);
        }
        ExamCommand::Open { id } => {
            let exam = state
                .exams
                .set_booking_open(ExamId::from_uuid(*id), true)
                .await?;
            output::print_success(&format!("Exam '{}' is open for booking", exam.name));
        }
        ExamCommand::Close { id } => {
            let exam = state
                .exams
                .set_booking_open(ExamId::from_uuid(*id), false)
                .await?;
            output::print_success(&format!("Exam '{}' is closed for booking", exam.name));
        }
        ExamCommand::Delete { id, force } => {
            let exam_id = ExamId::from_uuid(*id);
            let exam = state.exams.get_exam(exam_id).await?;
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Delete exam '{}' with all its quotas and bookings?",
                        exam.name
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let report = state.exams.delete_exam(exam_id).await?;
            output::print_success(&format!(
                "Exam '{}' deleted: {} quota rows, {} bookings",
                exam.name, report.counters_removed, report.bookings_removed
            ));
        }
    }

    Ok(())
}
