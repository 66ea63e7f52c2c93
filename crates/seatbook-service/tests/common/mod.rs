//! Shared fixtures for service integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use seatbook_cache::CacheManager;
use seatbook_cache::memory::MemoryCacheProvider;
use seatbook_core::config::MemoryCacheConfig;
use seatbook_database::{BookingStore, MemoryBookingStore};
use seatbook_entity::{Category, DemandSpec, Department, StudentProfile};
use seatbook_service::{
    AvailabilityCache, AvailabilityView, BookingCoordinator, CachedAvailability, ExamService,
    InventorySummary, NewExam, NewStudent, QuotaPlanner, RosterService,
};

pub struct Harness {
    pub store: Arc<dyn BookingStore>,
    pub roster: RosterService,
    pub exams: ExamService,
    pub coordinator: BookingCoordinator,
    pub availability: CachedAvailability,
}

pub fn harness(lock_timeout: Duration) -> Harness {
    let store: Arc<dyn BookingStore> = Arc::new(MemoryBookingStore::new(lock_timeout));
    let provider = MemoryCacheProvider::new(&MemoryCacheConfig::default());
    let cache = AvailabilityCache::new(
        CacheManager::from_provider(Arc::new(provider)),
        Duration::from_secs(60),
    );

    Harness {
        roster: RosterService::new(Arc::clone(&store)),
        exams: ExamService::new(
            Arc::clone(&store),
            QuotaPlanner::default(),
            Some(cache.clone()),
        ),
        coordinator: BookingCoordinator::new(Arc::clone(&store)).with_cache(cache.clone()),
        availability: CachedAvailability::new(
            AvailabilityView::new(Arc::clone(&store)),
            Some(cache),
        ),
        store,
    }
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 11, 2).expect("valid date")
}

impl Harness {
    pub async fn department(&self, code: &str) -> Department {
        self.roster
            .create_department(code, &format!("Department of {code}"))
            .await
            .expect("department")
    }

    /// Register `count` students named `{code}{n:03}` in one partition.
    pub async fn students(
        &self,
        department: &Department,
        category: Category,
        count: usize,
    ) -> Vec<StudentProfile> {
        let mut out = Vec::with_capacity(count);
        for n in 0..count {
            let student = self
                .roster
                .register_student(NewStudent {
                    roll_no: format!("{}{}{n:03}", department.code, category.code()),
                    name: format!("Student {n}"),
                    email: None,
                    department_code: department.code.clone(),
                    category,
                })
                .await
                .expect("student");
            out.push(student);
        }
        out
    }

    pub async fn exam(&self, name: &str, days: i32, demands: Vec<DemandSpec>) -> InventorySummary {
        self.exams
            .initialize_exam(NewExam {
                name: name.to_string(),
                start_date: start_date(),
                day_count: days,
                demands,
            })
            .await
            .expect("exam")
    }
}
