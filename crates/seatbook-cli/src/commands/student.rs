//! Student management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use seatbook_core::error::AppError;
use seatbook_entity::{Category, StudentProfile};
use seatbook_service::NewStudent;

use crate::output::{self, OutputFormat};

/// Arguments for student commands
#[derive(Debug, Args)]
pub struct StudentArgs {
    /// Student subcommand
    #[command(subcommand)]
    pub command: StudentCommand,
}

/// Student subcommands
#[derive(Debug, Subcommand)]
pub enum StudentCommand {
    /// Register a student
    Add {
        /// Roll number
        roll_no: String,
        /// Full name
        name: String,
        /// Department code
        #[arg(short, long)]
        department: String,
        /// Category: DAY, HOSTEL_MALE, HOSTEL_FEMALE (or 1, 2, 3)
        #[arg(short = 't', long)]
        category: String,
        /// Contact email
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Show one student
    Show {
        /// Roll number
        roll_no: String,
    },
    /// List students
    List {
        /// Filter by department code
        #[arg(short, long)]
        department: Option<String>,
    },
}

/// Student display row for table output
#[derive(Debug, Serialize, Tabled)]
struct StudentRow {
    /// Roll number
    roll_no: String,
    /// Name
    name: String,
    /// Category
    category: String,
    /// Email
    email: String,
}

impl From<&StudentProfile> for StudentRow {
    fn from(s: &StudentProfile) -> Self {
        Self {
            roll_no: s.roll_no.clone(),
            name: s.name.clone(),
            category: s.category.to_string(),
            email: s.email.clone().unwrap_or_default(),
        }
    }
}

/// Execute student commands
pub async fn execute(
    args: &StudentArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let state = super::connect(config_path).await?;

    match &args.command {
        StudentCommand::Add {
            roll_no,
            name,
            department,
            category,
            email,
        } => {
            let category: Category = category.parse()?;
            let student = state
                .roster
                .register_student(NewStudent {
                    roll_no: roll_no.clone(),
                    name: name.clone(),
                    email: email.clone(),
                    department_code: department.clone(),
                    category,
                })
                .await?;
            output::print_success(&format!(
                "Student '{}' registered as {}",
                student.roll_no, student.category
            ));
        }
        StudentCommand::Show { roll_no } => {
            let student = state.roster.get_student(roll_no).await?;
            output::print_item(
                &student,
                &[
                    ("Roll number", student.roll_no.clone()),
                    ("Name", student.name.clone()),
                    ("Department", student.department_id.to_string()),
                    ("Category", student.category.to_string()),
                    ("Email", student.email.clone().unwrap_or_default()),
                ],
                format,
            );
        }
        StudentCommand::List { department } => {
            let students = state.roster.list_students(department.as_deref()).await?;
            let rows: Vec<StudentRow> = students.iter().map(StudentRow::from).collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
