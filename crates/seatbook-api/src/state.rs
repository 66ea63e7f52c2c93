//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use seatbook_cache::CacheManager;
use seatbook_core::config::AppConfig;
use seatbook_database::{BookingStore, DatabasePool};
use seatbook_service::{
    AvailabilityCache, AvailabilityView, BookingCoordinator, CachedAvailability, ExamService,
    QuotaPlanner, RosterService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Process start, for uptime reporting
    pub started_at: Instant,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL pool, present only for the postgres backend
    pub db: Option<Arc<DatabasePool>>,
    /// Booking store owning the quota ledger
    pub store: Arc<dyn BookingStore>,
    /// Cache manager (Redis or in-memory)
    pub cache: Option<Arc<CacheManager>>,

    // ── Services ─────────────────────────────────────────────
    /// Departments and students
    pub roster: Arc<RosterService>,
    /// Exam inventory and lifecycle
    pub exams: Arc<ExamService>,
    /// Booking attempts
    pub bookings: Arc<BookingCoordinator>,
    /// Availability listings
    pub availability: Arc<CachedAvailability>,
}

impl AppState {
    /// Wire every service over `store`.
    ///
    /// Availability caching is enabled when `cache` is set and the configured
    /// TTL is non-zero.
    pub fn new(
        config: AppConfig,
        db: Option<DatabasePool>,
        store: Arc<dyn BookingStore>,
        cache: Option<CacheManager>,
    ) -> Self {
        let ttl = config.booking.availability_ttl();
        let availability_cache = cache
            .clone()
            .filter(|_| !ttl.is_zero())
            .map(|manager| AvailabilityCache::new(manager, ttl));

        let planner = QuotaPlanner::new(config.booking.max_demand_per_pair);
        let mut coordinator = BookingCoordinator::new(Arc::clone(&store));
        if let Some(cache) = &availability_cache {
            coordinator = coordinator.with_cache(cache.clone());
        }

        Self {
            started_at: Instant::now(),
            db: db.map(Arc::new),
            roster: Arc::new(RosterService::new(Arc::clone(&store))),
            exams: Arc::new(ExamService::new(
                Arc::clone(&store),
                planner,
                availability_cache.clone(),
            )),
            bookings: Arc::new(coordinator),
            availability: Arc::new(CachedAvailability::new(
                AvailabilityView::new(Arc::clone(&store)),
                availability_cache,
            )),
            cache: cache.map(Arc::new),
            store,
            config: Arc::new(config),
        }
    }
}
