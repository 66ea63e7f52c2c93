//! Read-through caching of availability listings.
//!
//! Listings are advisory: a stale entry can only make a booking attempt fail
//! with `QuotaExhausted`, never oversell, because the ledger is read directly
//! by every claim. Entries carry a short TTL and are dropped after each
//! committed booking in their partition.

use std::time::Duration;

use tracing::{debug, warn};

use seatbook_cache::{CacheManager, keys};
use seatbook_core::result::AppResult;
use seatbook_core::traits::cache::CacheProvider;
use seatbook_core::types::{DepartmentId, ExamId};
use seatbook_entity::{AvailableSlot, Category};

use super::view::{AvailabilityView, ExamAvailability, summarize};

/// Availability entries in the shared cache.
#[derive(Debug, Clone)]
pub struct AvailabilityCache {
    cache: CacheManager,
    ttl: Duration,
}

impl AvailabilityCache {
    /// Cache listings in `cache` for `ttl`.
    pub fn new(cache: CacheManager, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// How long a listing is served before it is rebuilt.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The underlying cache manager.
    pub fn manager(&self) -> &CacheManager {
        &self.cache
    }

    /// Cached listing for one partition.
    pub async fn get(
        &self,
        department_id: DepartmentId,
        category: Category,
    ) -> AppResult<Option<Vec<AvailableSlot>>> {
        self.cache
            .get_json(&keys::availability(department_id, category))
            .await
    }

    /// Store the listing for one partition.
    pub async fn put(
        &self,
        department_id: DepartmentId,
        category: Category,
        slots: &[AvailableSlot],
    ) -> AppResult<()> {
        self.cache
            .set_json(&keys::availability(department_id, category), &slots, self.ttl)
            .await
    }

    /// Drop the entries a booking in this partition made stale.
    ///
    /// Failures are logged and swallowed; the TTL bounds staleness.
    pub async fn invalidate_partition(
        &self,
        department_id: DepartmentId,
        category: Category,
        exam_id: ExamId,
    ) {
        let listing = keys::availability(department_id, category);
        if let Err(e) = self.cache.delete(&listing).await {
            warn!(key = %listing, error = %e, "Failed to invalidate availability");
        }
        self.invalidate_exam(exam_id).await;
    }

    /// Drop the cached quota table of one exam.
    pub async fn invalidate_exam(&self, exam_id: ExamId) {
        let key = keys::exam_quotas(exam_id);
        if let Err(e) = self.cache.delete(&key).await {
            warn!(key = %key, error = %e, "Failed to invalidate exam quotas");
        }
    }

    /// Drop every availability listing. Used when an exam is installed,
    /// removed, opened or closed.
    pub async fn invalidate_all(&self) {
        match self.cache.delete_prefix(&keys::availability_prefix()).await {
            Ok(removed) => debug!(removed, "Availability listings invalidated"),
            Err(e) => warn!(error = %e, "Failed to invalidate availability listings"),
        }
    }
}

/// [`AvailabilityView`] with an optional read-through cache in front.
#[derive(Debug, Clone)]
pub struct CachedAvailability {
    view: AvailabilityView,
    cache: Option<AvailabilityCache>,
}

impl CachedAvailability {
    /// Wrap `view`; with `cache` unset every call goes to the store.
    pub fn new(view: AvailabilityView, cache: Option<AvailabilityCache>) -> Self {
        Self { view, cache }
    }

    /// The uncached view.
    pub fn view(&self) -> &AvailabilityView {
        &self.view
    }

    /// Open days with seats left for `roll_no`.
    ///
    /// Cache errors fall back to the store.
    pub async fn list_available(&self, roll_no: &str) -> AppResult<Vec<AvailableSlot>> {
        let student = self.view.student(roll_no).await?;
        let Some(cache) = &self.cache else {
            return self
                .view
                .for_partition(student.department_id, student.category)
                .await;
        };

        match cache.get(student.department_id, student.category).await {
            Ok(Some(slots)) => {
                debug!(roll_no, "Availability served from cache");
                return Ok(slots);
            }
            Ok(None) => {}
            Err(e) => warn!(roll_no, error = %e, "Availability cache read failed"),
        }

        let slots = self
            .view
            .for_partition(student.department_id, student.category)
            .await?;
        if let Err(e) = cache
            .put(student.department_id, student.category, &slots)
            .await
        {
            warn!(roll_no, error = %e, "Availability cache write failed");
        }
        Ok(slots)
    }

    /// Per-exam totals for `roll_no`.
    pub async fn list_available_exams(&self, roll_no: &str) -> AppResult<Vec<ExamAvailability>> {
        Ok(summarize(&self.list_available(roll_no).await?))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use seatbook_cache::memory::MemoryCacheProvider;
    use seatbook_core::config::MemoryCacheConfig;
    use seatbook_core::types::QuotaId;

    fn cache() -> AvailabilityCache {
        let provider = MemoryCacheProvider::new(&MemoryCacheConfig::default());
        AvailabilityCache::new(
            CacheManager::from_provider(Arc::new(provider)),
            Duration::from_secs(30),
        )
    }

    fn slot(exam_id: ExamId) -> AvailableSlot {
        AvailableSlot {
            quota_id: QuotaId::new(),
            exam_id,
            exam_name: "Midterm".to_string(),
            day_index: 0,
            slot_date: chrono::NaiveDate::from_ymd_opt(2026, 11, 2).expect("valid date"),
            category: Category::Day,
            remaining: 3,
        }
    }

    #[tokio::test]
    async fn test_put_then_invalidate_partition() {
        let cache = cache();
        let dept = DepartmentId::new();
        let exam = ExamId::new();
        cache
            .put(dept, Category::Day, &[slot(exam)])
            .await
            .expect("put");
        assert_eq!(
            cache.get(dept, Category::Day).await.expect("get").map(|s| s.len()),
            Some(1)
        );

        cache.invalidate_partition(dept, Category::Day, exam).await;
        assert!(cache.get(dept, Category::Day).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_partitions_are_independent() {
        let cache = cache();
        let dept = DepartmentId::new();
        let exam = ExamId::new();
        cache
            .put(dept, Category::Day, &[slot(exam)])
            .await
            .expect("put");
        cache
            .put(dept, Category::HostelMale, &[slot(exam)])
            .await
            .expect("put");

        cache.invalidate_partition(dept, Category::Day, exam).await;
        assert!(
            cache
                .get(dept, Category::HostelMale)
                .await
                .expect("get")
                .is_some()
        );
    }
}
