//! Splits aggregate per-department/category demand into per-day capacity.
//!
//! Each day receives `floor(T / N)` seats and the first `T mod N` days one
//! more, so the shares sum to `T` exactly and differ by at most one. Days
//! whose share is zero produce no counter row.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_core::types::{DepartmentId, ExamId};
use seatbook_entity::{Category, DemandSpec, ExamWindow, QuotaCounter, QuotaKey};

/// Longest exam window accepted, in days.
pub const MAX_DAYS: i32 = 366;

/// The per-day split for one demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAllocation {
    /// Department the seats belong to.
    pub department_id: DepartmentId,
    /// Category the seats belong to.
    pub category: Category,
    /// Requested total.
    pub total: i64,
    /// Seats per day, index 0 first. Always `day_count` long.
    pub per_day: Vec<u32>,
}

/// Output of [`QuotaPlanner::plan`]: the exam and every row to install.
#[derive(Debug, Clone)]
pub struct QuotaPlan {
    /// The exam window, still `Generating`.
    pub exam: ExamWindow,
    /// One entry per demand, in request order.
    pub allocations: Vec<DayAllocation>,
    /// Counter rows with non-zero capacity.
    pub counters: Vec<QuotaCounter>,
}

impl QuotaPlan {
    /// Total seats across all rows.
    pub fn total_seats(&self) -> i64 {
        self.counters.iter().map(|c| i64::from(c.capacity())).sum()
    }
}

/// What an installed plan created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySummary {
    /// Installed exam.
    pub exam_id: ExamId,
    /// Exam name.
    pub name: String,
    /// First exam day.
    pub start_date: NaiveDate,
    /// Number of days.
    pub day_count: i32,
    /// Counter rows created.
    pub rows_created: usize,
    /// Sum of all capacities.
    pub total_seats: i64,
    /// Per-demand day sequences.
    pub allocations: Vec<DayAllocation>,
}

impl InventorySummary {
    /// Summarize `plan` as installed under `exam`.
    pub fn from_plan(exam: &ExamWindow, plan: &QuotaPlan) -> Self {
        Self {
            exam_id: exam.id,
            name: exam.name.clone(),
            start_date: exam.start_date,
            day_count: exam.day_count,
            rows_created: plan.counters.len(),
            total_seats: plan.total_seats(),
            allocations: plan.allocations.clone(),
        }
    }
}

/// Stateless quota planner.
#[derive(Debug, Clone, Copy)]
pub struct QuotaPlanner {
    max_demand_per_pair: i64,
}

impl QuotaPlanner {
    /// Create a planner rejecting demands above `max_demand_per_pair`.
    pub fn new(max_demand_per_pair: i64) -> Self {
        Self {
            max_demand_per_pair,
        }
    }

    /// Reject windows outside `1..=MAX_DAYS`.
    pub fn check_window(day_count: i32) -> AppResult<()> {
        if day_count <= 0 {
            return Err(AppError::configuration(format!(
                "Exam window must span at least one day, got {day_count}"
            )));
        }
        if day_count > MAX_DAYS {
            return Err(AppError::configuration(format!(
                "Exam window of {day_count} days exceeds the {MAX_DAYS}-day limit"
            )));
        }
        Ok(())
    }

    /// Split `total` seats over `day_count` days, remainder to the first days.
    pub fn allocate(day_count: i32, total: i64) -> AppResult<Vec<u32>> {
        Self::check_window(day_count)?;
        if total < 0 {
            return Err(AppError::configuration(format!(
                "Demand must be non-negative, got {total}"
            )));
        }

        let days = i64::from(day_count);
        let base = total / days;
        let remainder = total % days;
        let widest = base + i64::from(remainder > 0);
        if i32::try_from(widest).is_err() {
            return Err(AppError::configuration(format!(
                "Demand of {total} seats is too large for {day_count} days"
            )));
        }

        Ok((0..days)
            .map(|day| (base + i64::from(day < remainder)) as u32)
            .collect())
    }

    /// Validate the whole request and produce every row to install.
    ///
    /// Nothing is written here; any invalid demand fails the entire plan.
    pub fn plan(&self, exam: ExamWindow, demands: &[DemandSpec]) -> AppResult<QuotaPlan> {
        Self::check_window(exam.day_count)?;

        let mut seen = HashSet::with_capacity(demands.len());
        for demand in demands {
            if !seen.insert((demand.department_id, demand.category)) {
                return Err(AppError::configuration(format!(
                    "Duplicate demand for department {} / {}",
                    demand.department_id, demand.category
                )));
            }
            if demand.total > self.max_demand_per_pair {
                return Err(AppError::configuration(format!(
                    "Demand of {} for department {} / {} exceeds the limit of {}",
                    demand.total, demand.department_id, demand.category, self.max_demand_per_pair
                )));
            }
        }

        let mut allocations = Vec::with_capacity(demands.len());
        let mut counters = Vec::new();
        for demand in demands {
            let per_day = Self::allocate(exam.day_count, demand.total)?;
            for (day, &share) in per_day.iter().enumerate() {
                if share == 0 {
                    continue;
                }
                let day_index = day as i32;
                let slot_date = exam.day_date(day_index).ok_or_else(|| {
                    AppError::configuration(format!(
                        "Day {day_index} of exam '{}' is not a valid calendar date",
                        exam.name
                    ))
                })?;
                let key = QuotaKey::new(exam.id, day_index, demand.department_id, demand.category);
                counters.push(QuotaCounter::new(key, slot_date, share)?);
            }
            allocations.push(DayAllocation {
                department_id: demand.department_id,
                category: demand.category,
                total: demand.total,
                per_day,
            });
        }

        Ok(QuotaPlan {
            exam,
            allocations,
            counters,
        })
    }
}

impl Default for QuotaPlanner {
    fn default() -> Self {
        Self::new(i64::from(i32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatbook_core::ErrorKind;

    fn exam(days: i32) -> ExamWindow {
        let start = NaiveDate::from_ymd_opt(2026, 11, 2).expect("valid date");
        ExamWindow::new("Endsem", start, days)
    }

    #[test]
    fn test_ten_over_three_days() {
        assert_eq!(QuotaPlanner::allocate(3, 10).expect("plan"), vec![4, 3, 3]);
    }

    #[test]
    fn test_remainder_goes_to_first_days() {
        assert_eq!(QuotaPlanner::allocate(4, 7).expect("plan"), vec![2, 2, 2, 1]);
        assert_eq!(QuotaPlanner::allocate(5, 2).expect("plan"), vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_conservation_and_balance() {
        for days in 1..=12 {
            for total in 0..=200 {
                let split = QuotaPlanner::allocate(days, total).expect("plan");
                assert_eq!(split.len(), days as usize);
                assert_eq!(split.iter().map(|&s| i64::from(s)).sum::<i64>(), total);
                let base = (total / i64::from(days)) as u32;
                assert!(split.iter().all(|&s| s == base || s == base + 1));
                assert!(split.windows(2).all(|w| w[0] >= w[1]));
            }
        }
    }

    #[test]
    fn test_zero_days_is_configuration_error() {
        let err = QuotaPlanner::allocate(0, 10).expect_err("zero days");
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_negative_total_is_configuration_error() {
        let err = QuotaPlanner::allocate(3, -1).expect_err("negative");
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_zero_total_generates_no_rows() {
        let demand = DemandSpec::new(DepartmentId::new(), Category::Day, 0);
        let plan = QuotaPlanner::default().plan(exam(3), &[demand]).expect("plan");
        assert!(plan.counters.is_empty());
        assert_eq!(plan.allocations[0].per_day, vec![0, 0, 0]);
    }

    #[test]
    fn test_zero_share_days_are_skipped() {
        let demand = DemandSpec::new(DepartmentId::new(), Category::HostelFemale, 2);
        let plan = QuotaPlanner::default().plan(exam(5), &[demand]).expect("plan");
        assert_eq!(plan.counters.len(), 2);
        assert_eq!(plan.counters[0].day_index, 0);
        assert_eq!(plan.counters[1].day_index, 1);
        assert_eq!(plan.total_seats(), 2);
    }

    #[test]
    fn test_rows_carry_dates_and_keys() {
        let dept = DepartmentId::new();
        let demand = DemandSpec::new(dept, Category::Day, 10);
        let window = exam(3);
        let plan = QuotaPlanner::default().plan(window.clone(), &[demand]).expect("plan");
        let capacities: Vec<i32> = plan.counters.iter().map(|c| c.capacity()).collect();
        assert_eq!(capacities, vec![4, 3, 3]);
        assert_eq!(plan.counters[2].slot_date, window.day_date(2).expect("day 2"));
        assert!(plan.counters.iter().all(|c| c.exam_id == window.id && c.booked() == 0));
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let dept = DepartmentId::new();
        let demands = [
            DemandSpec::new(dept, Category::Day, 5),
            DemandSpec::new(dept, Category::Day, 7),
        ];
        let err = QuotaPlanner::default().plan(exam(2), &demands).expect_err("duplicate");
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_one_bad_spec_fails_whole_plan() {
        let demands = [
            DemandSpec::new(DepartmentId::new(), Category::Day, 5),
            DemandSpec::new(DepartmentId::new(), Category::Day, -3),
        ];
        assert!(QuotaPlanner::default().plan(exam(2), &demands).is_err());
    }

    #[test]
    fn test_window_checked_without_demands() {
        for days in [0, -5, MAX_DAYS + 1] {
            let err = QuotaPlanner::default().plan(exam(days), &[]).expect_err("bad window");
            assert_eq!(err.kind, ErrorKind::Configuration);
        }
        assert!(QuotaPlanner::default().plan(exam(MAX_DAYS), &[]).is_ok());
    }

    #[test]
    fn test_share_wider_than_a_slot_is_rejected() {
        let err = QuotaPlanner::allocate(1, 3_000_000_000).expect_err("too wide");
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert_eq!(
            QuotaPlanner::allocate(2, 3_000_000_000).expect("fits"),
            vec![1_500_000_000, 1_500_000_000]
        );
    }

    #[test]
    fn test_default_limit_keeps_capacity_exact() {
        let demand = DemandSpec::new(DepartmentId::new(), Category::Day, 3_000_000_000);
        let err = QuotaPlanner::default().plan(exam(1), &[demand]).expect_err("limit");
        assert_eq!(err.kind, ErrorKind::Configuration);

        let demand = DemandSpec::new(DepartmentId::new(), Category::Day, i64::from(i32::MAX));
        let plan = QuotaPlanner::default().plan(exam(1), &[demand]).expect("plan");
        assert_eq!(plan.total_seats(), i64::from(i32::MAX));
    }

    #[test]
    fn test_demand_limit() {
        let demand = DemandSpec::new(DepartmentId::new(), Category::Day, 101);
        let err = QuotaPlanner::new(100).plan(exam(2), &[demand]).expect_err("limit");
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
