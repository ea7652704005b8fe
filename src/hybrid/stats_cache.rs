//! Statistics Cache: per-collection field statistics with age-based
//! eviction, narrowed to the get/update/evict surface the optimizer needs.

use super::types::CollectionStatistics;
use chrono::Utc;
use dashmap::DashMap;
use std::time::Duration;

#[derive(Default)]
pub struct StatsCache {
    entries: DashMap<String, CollectionStatistics>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, collection: &str) -> Option<CollectionStatistics> {
        self.entries.get(collection).map(|e| e.clone())
    }

    pub fn update(&self, stats: CollectionStatistics) {
        self.entries.insert(stats.collection.clone(), stats);
    }

    pub fn delete(&self, collection: &str) {
        self.entries.remove(collection);
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Age of the cached entry, or `None` if absent.
    pub fn get_age(&self, collection: &str) -> Option<Duration> {
        self.entries.get(collection).map(|e| {
            let delta = Utc::now().signed_duration_since(e.last_updated);
            delta.to_std().unwrap_or(Duration::ZERO)
        })
    }

    /// Drops entries older than `max_age`.
    pub fn evict_old(&self, max_age: Duration) {
        let now = Utc::now();
        self.entries.retain(|_, stats| {
            let age = now.signed_duration_since(stats.last_updated);
            age.to_std().unwrap_or(Duration::ZERO) <= max_age
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn stats(collection: &str) -> CollectionStatistics {
        CollectionStatistics {
            collection: collection.to_string(),
            total_rows: 1000,
            fields: HashMap::new(),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn round_trip_update_then_get() {
        let cache = StatsCache::new();
        cache.update(stats("c1"));
        let fetched = cache.get("c1").unwrap();
        assert_eq!(fetched.total_rows, 1000);
    }

    #[test]
    fn evict_old_with_zero_age_clears_everything() {
        let cache = StatsCache::new();
        cache.update(stats("c1"));
        cache.update(stats("c2"));
        cache.evict_old(Duration::from_secs(0));
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn delete_removes_single_entry() {
        let cache = StatsCache::new();
        cache.update(stats("c1"));
        cache.update(stats("c2"));
        cache.delete("c1");
        assert!(cache.get("c1").is_none());
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn get_age_is_none_for_unknown_collection() {
        let cache = StatsCache::new();
        assert!(cache.get_age("ghost").is_none());
    }

    #[test]
    fn clear_drops_every_entry() {
        let cache = StatsCache::new();
        cache.update(stats("c1"));
        cache.clear();
        assert_eq!(cache.size(), 0);
    }
}
