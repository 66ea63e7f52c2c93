//! Department management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use seatbook_core::error::AppError;
use seatbook_entity::Department;

use crate::output::{self, OutputFormat};

/// Arguments for department commands
#[derive(Debug, Args)]
pub struct DepartmentArgs {
    /// Department subcommand
    #[command(subcommand)]
    pub command: DepartmentCommand,
}

/// Department subcommands
#[derive(Debug, Subcommand)]
pub enum DepartmentCommand {
    /// Register a department
    Add {
        /// Short unique code, e.g. CSE
        code: String,
        /// Display name
        name: String,
    },
    /// List departments
    List,
}

/// Department display row for table output
#[derive(Debug, Serialize, Tabled)]
struct DepartmentRow {
    /// Department ID
    id: String,
    /// Code
    code: String,
    /// Name
    name: String,
}

impl From<&Department> for DepartmentRow {
    fn from(d: &Department) -> Self {
        Self {
            id: d.id.to_string(),
            code: d.code.clone(),
            name: d.name.clone(),
        }
    }
}

/// Execute department commands
pub async fn execute(
    args: &DepartmentArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let state = super::connect(config_path).await?;

    match &args.command {
        DepartmentCommand::Add { code, name } => {
            let department = state.roster.create_department(code, name).await?;
            output::print_success(&format!(
                "Department '{}' created ({})",
                department.code, department.id
            ));
        }
        DepartmentCommand::List => {
            let departments = state.roster.list_departments().await?;
            let rows: Vec<DepartmentRow> = departments.iter().map(DepartmentRow::from).collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
