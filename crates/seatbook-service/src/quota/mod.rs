//! Quota planning and the quota ledger.

pub mod ledger;
pub mod planner;

pub use ledger::QuotaLedger;
pub use planner::{DayAllocation, InventorySummary, QuotaPlan, QuotaPlanner};
