//! Data model for the Tier Manager.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Storage tier classification, ordered hottest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Hot,
    Warm,
    Cold,
}

impl Tier {
    /// Ordinal used by the priority formula: hotter tiers have a lower
    /// ordinal.
    pub fn ordinal(self) -> u32 {
        match self {
            Tier::Hot => 0,
            Tier::Warm => 1,
            Tier::Cold => 2,
        }
    }

    pub fn is_hotter_than(self, other: Tier) -> bool {
        self.ordinal() < other.ordinal()
    }
}

/// Per-segment access statistics maintained by the Access Tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentAccessStats {
    pub segment_id: String,
    #[serde(skip, default = "Instant::now")]
    pub last_access: Instant,
    pub access_count: u64,
    pub bytes_read: u64,
    /// Exponential moving average latency in ms, alpha = 0.3.
    pub avg_latency_ms: f64,
    pub current_tier: Tier,
    #[serde(skip)]
    pub last_migration: Option<Instant>,
}

impl SegmentAccessStats {
    /// A segment observed for the first time defaults to Cold.
    pub fn new(segment_id: impl Into<String>) -> Self {
        Self {
            segment_id: segment_id.into(),
            last_access: Instant::now(),
            access_count: 0,
            bytes_read: 0,
            avg_latency_ms: 0.0,
            current_tier: Tier::Cold,
            last_migration: None,
        }
    }
}

pub const EMA_ALPHA: f64 = 0.3;

/// Status of a migration task, transitioning monotonically
/// Pending -> Running -> {Completed, Failed}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl MigrationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, MigrationStatus::Completed | MigrationStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationTask {
    pub id: Uuid,
    pub segment_id: String,
    pub source_tier: Tier,
    pub destination_tier: Tier,
    pub priority: i64,
    #[serde(skip, default = "Instant::now")]
    pub create_time: Instant,
    pub status: MigrationStatus,
}

impl MigrationTask {
    pub fn new(segment_id: impl Into<String>, source_tier: Tier, destination_tier: Tier, priority: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            segment_id: segment_id.into(),
            source_tier,
            destination_tier,
            priority,
            create_time: Instant::now(),
            status: MigrationStatus::Pending,
        }
    }

    pub fn is_promotion(&self) -> bool {
        self.destination_tier.is_hotter_than(self.source_tier)
    }
}

/// Migration priority: promotions always outrank demotions; within each
/// group, hotter targets/sources rank higher.
pub fn migration_priority(source_tier: Tier, destination_tier: Tier) -> i64 {
    if destination_tier.is_hotter_than(source_tier) {
        100 - 10 * destination_tier.ordinal() as i64
    } else {
        50 - 10 * source_tier.ordinal() as i64
    }
}

/// Policy thresholds driving `DetermineTier`.
#[derive(Debug, Clone)]
pub struct TieringPolicy {
    pub enabled: bool,
    pub hot_enabled: bool,
    pub warm_enabled: bool,
    pub hot_threshold: Duration,
    pub warm_threshold: Duration,
    pub min_access_count: u64,
    pub hot_access_count_threshold: u64,
    pub hot_max_memory_gb: f64,
    pub warm_max_size_gb: f64,
}

impl Default for TieringPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            hot_enabled: true,
            warm_enabled: true,
            hot_threshold: Duration::from_secs(3600),
            warm_threshold: Duration::from_secs(24 * 3600),
            min_access_count: 10,
            hot_access_count_threshold: 100,
            hot_max_memory_gb: 64.0,
            warm_max_size_gb: 512.0,
        }
    }
}

/// Per-tier capacity/used readout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct TierCapacity {
    pub capacity: u64,
    pub used: u64,
    pub available: u64,
}

/// Migrator counters returned alongside tier capacities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct MigratorCounts {
    pub pending: usize,
    pub running: usize,
    pub completed: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct TierStatistics {
    pub hot: TierCapacity,
    pub warm: TierCapacity,
    pub cold: TierCapacity,
    pub migrator: MigratorCounts,
}
