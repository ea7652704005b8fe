//! Tier Migrator: schedules and dispatches migration tasks across tier
//! backends.

use super::backend::TierBackend;
use super::types::{migration_priority, MigrationStatus, MigrationTask, MigratorCounts, Tier};
use crate::error::{CoreError, Result};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};
use uuid::Uuid;

const TERMINAL_RING_CAPACITY: usize = 1000;
const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const DEFAULT_CONCURRENCY: usize = 4;

struct MigratorState {
    pending: Vec<MigrationTask>,
    running: HashMap<String, MigrationTask>,
    terminal: VecDeque<MigrationTask>,
    completed_count: u64,
    failed_count: u64,
}

impl MigratorState {
    fn new() -> Self {
        Self {
            pending: Vec::new(),
            running: HashMap::new(),
            terminal: VecDeque::new(),
            completed_count: 0,
            failed_count: 0,
        }
    }

    fn has_nonterminal(&self, segment_id: &str) -> bool {
        self.running.contains_key(segment_id)
            || self.pending.iter().any(|t| t.segment_id == segment_id)
    }

    fn sort_pending(&mut self) {
        self.pending.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    fn finalize(&mut self, id: Uuid, segment_id: &str, status: MigrationStatus) {
        if let Some(mut task) = self.running.remove(segment_id) {
            task.status = status;
            match status {
                MigrationStatus::Completed => self.completed_count += 1,
                MigrationStatus::Failed => self.failed_count += 1,
                _ => {}
            }
            if self.terminal.len() >= TERMINAL_RING_CAPACITY {
                self.terminal.pop_front();
            }
            self.terminal.push_back(task);
        }
        let _ = id;
    }
}

/// Maintains the priority-ordered pending list, the in-flight task map, and
/// the ring buffer of the last 1000 terminal tasks.
pub struct TierMigrator {
    state: Mutex<MigratorState>,
    concurrency: usize,
    task_timeout: Duration,
}

impl TierMigrator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MigratorState::new()),
            concurrency: DEFAULT_CONCURRENCY,
            task_timeout: DEFAULT_TASK_TIMEOUT,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Fails when a migration for the same segment is already pending or
    /// running. Otherwise inserts into pending and re-sorts by descending
    /// priority.
    pub fn schedule(&self, segment_id: &str, source_tier: Tier, destination_tier: Tier) -> Result<Uuid> {
        let mut state = self.state.lock();
        if state.has_nonterminal(segment_id) {
            return Err(CoreError::AlreadyScheduled(segment_id.to_string()));
        }
        let priority = migration_priority(source_tier, destination_tier);
        let task = MigrationTask::new(segment_id, source_tier, destination_tier, priority);
        let id = task.id;
        state.pending.push(task);
        state.sort_pending();
        Ok(id)
    }

    pub fn status_of(&self, segment_id: &str) -> Option<MigrationStatus> {
        let state = self.state.lock();
        if let Some(task) = state.running.get(segment_id) {
            return Some(task.status);
        }
        if state.pending.iter().any(|t| t.segment_id == segment_id) {
            return Some(MigrationStatus::Pending);
        }
        state
            .terminal
            .iter()
            .rev()
            .find(|t| t.segment_id == segment_id)
            .map(|t| t.status)
    }

    pub fn counts(&self) -> MigratorCounts {
        let state = self.state.lock();
        MigratorCounts {
            pending: state.pending.len(),
            running: state.running.len(),
            completed: state.completed_count,
            failed: state.failed_count,
        }
    }

    fn drain_for_dispatch(&self) -> Vec<MigrationTask> {
        let mut state = self.state.lock();
        let slots = self.concurrency.saturating_sub(state.running.len());
        let mut dispatched = Vec::new();
        for _ in 0..slots {
            if state.pending.is_empty() {
                break;
            }
            let task = state.pending.remove(0);
            state.running.insert(task.segment_id.clone(), task.clone());
            dispatched.push(task);
        }
        dispatched
    }

    /// One dispatcher tick: promotes pending tasks into running up to the
    /// concurrency bound, then executes each promoted task to completion in
    /// parallel, bounded by `task_timeout`. Returns the destination tier
    /// alongside each outcome so the caller can stamp `current_tier`
    /// atomically with finalisation.
    pub async fn tick(
        self: &Arc<Self>,
        tiers: &HashMap<Tier, Arc<dyn TierBackend>>,
    ) -> Vec<(String, Tier, MigrationStatus)> {
        let dispatched = self.drain_for_dispatch();
        if dispatched.is_empty() {
            return Vec::new();
        }

        let mut handles = Vec::with_capacity(dispatched.len());
        for task in dispatched {
            let migrator = Arc::clone(self);
            let source = tiers.get(&task.source_tier).cloned();
            let destination = tiers.get(&task.destination_tier).cloned();
            let task_timeout = self.task_timeout;
            handles.push(tokio::spawn(async move {
                let result = timeout(
                    task_timeout,
                    execute_migration(task.clone(), source, destination),
                )
                .await;
                let status = match result {
                    Ok(status) => status,
                    Err(_) => {
                        warn!(segment_id = %task.segment_id, "migration timed out");
                        MigrationStatus::Failed
                    }
                };
                migrator.state.lock().finalize(task.id, &task.segment_id, status);
                (task.segment_id.clone(), task.destination_tier, status)
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(outcome) = handle.await {
                results.push(outcome);
            }
        }
        results
    }
}

impl Default for TierMigrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Verify the segment exists at the source, read its size, load a
/// same-sized payload at the destination, then unload from source. An
/// unload failure is logged but the migration is still reported Completed
/// since the authoritative copy already lives at the destination.
async fn execute_migration(
    task: MigrationTask,
    source: Option<Arc<dyn TierBackend>>,
    destination: Option<Arc<dyn TierBackend>>,
) -> MigrationStatus {
    let (Some(source), Some(destination)) = (source, destination) else {
        error!(segment_id = %task.segment_id, "migration references an unknown tier");
        return MigrationStatus::Failed;
    };

    let size = match source.size_of(&task.segment_id) {
        Some(size) => size,
        None => {
            error!(segment_id = %task.segment_id, "segment missing from source tier");
            return MigrationStatus::Failed;
        }
    };

    if let Err(e) = destination.load(&task.segment_id, size) {
        error!(segment_id = %task.segment_id, error = %e, "failed to load segment into destination tier");
        return MigrationStatus::Failed;
    }

    if let Err(e) = source.unload(&task.segment_id) {
        warn!(
            segment_id = %task.segment_id,
            error = %e,
            "failed to unload segment from source tier after migration; destination copy is authoritative"
        );
    }

    info!(
        segment_id = %task.segment_id,
        from = ?task.source_tier,
        to = ?task.destination_tier,
        "migration completed"
    );
    MigrationStatus::Completed
}
