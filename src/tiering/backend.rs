//! Tier backends: polymorphic over a shared capability set, implemented as
//! a small trait with three variants that share no state.

use super::types::Tier;
use crate::error::{CoreError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Capability set every tier backend exposes.
pub trait TierBackend: Send + Sync {
    fn get_type(&self) -> Tier;

    /// Fails with `InsufficientSpace` when `used + size > capacity`.
    fn load(&self, segment_id: &str, size: u64) -> Result<()>;

    /// Fails with `NotFound` for unknown segments.
    fn unload(&self, segment_id: &str) -> Result<()>;

    fn has(&self, segment_id: &str) -> bool;

    fn size_of(&self, segment_id: &str) -> Option<u64>;

    fn capacity(&self) -> u64;

    fn used(&self) -> u64;

    fn available(&self) -> u64 {
        self.capacity().saturating_sub(self.used())
    }
}

/// Shared bookkeeping: a segment-size map behind a lock, with `used` kept
/// exactly equal to the sum of resident segment sizes by serialising every
/// mutation through that same lock.
struct TierStore {
    capacity: u64,
    segments: Mutex<HashMap<String, u64>>,
}

impl TierStore {
    fn new(capacity: u64) -> Self {
        Self {
            capacity,
            segments: Mutex::new(HashMap::new()),
        }
    }

    fn load(&self, tier_name: &str, segment_id: &str, size: u64) -> Result<()> {
        let mut segments = self.segments.lock();
        let used: u64 = segments.values().sum();
        if used + size > self.capacity {
            return Err(CoreError::InsufficientSpace {
                tier: tier_name.to_string(),
                needed: size,
                available: self.capacity.saturating_sub(used),
            });
        }
        segments.insert(segment_id.to_string(), size);
        Ok(())
    }

    fn unload(&self, segment_id: &str) -> Result<()> {
        let mut segments = self.segments.lock();
        segments
            .remove(segment_id)
            .map(|_| ())
            .ok_or_else(|| CoreError::NotFound(format!("segment {segment_id} not resident")))
    }

    fn has(&self, segment_id: &str) -> bool {
        self.segments.lock().contains_key(segment_id)
    }

    fn size_of(&self, segment_id: &str) -> Option<u64> {
        self.segments.lock().get(segment_id).copied()
    }

    fn used(&self) -> u64 {
        self.segments.lock().values().sum()
    }
}

macro_rules! tier_backend_impl {
    ($name:ident, $tier:expr, $label:literal) => {
        pub struct $name {
            store: TierStore,
        }

        impl $name {
            pub fn new(capacity: u64) -> Self {
                Self {
                    store: TierStore::new(capacity),
                }
            }
        }

        impl TierBackend for $name {
            fn get_type(&self) -> Tier {
                $tier
            }

            fn load(&self, segment_id: &str, size: u64) -> Result<()> {
                self.store.load($label, segment_id, size)
            }

            fn unload(&self, segment_id: &str) -> Result<()> {
                self.store.unload(segment_id)
            }

            fn has(&self, segment_id: &str) -> bool {
                self.store.has(segment_id)
            }

            fn size_of(&self, segment_id: &str) -> Option<u64> {
                self.store.size_of(segment_id)
            }

            fn capacity(&self) -> u64 {
                self.store.capacity
            }

            fn used(&self) -> u64 {
                self.store.used()
            }
        }
    };
}

tier_backend_impl!(MemoryTier, Tier::Hot, "memory");
tier_backend_impl!(SsdTier, Tier::Warm, "ssd");
tier_backend_impl!(ObjectTier, Tier::Cold, "object");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_fails_without_side_effects_when_over_capacity() {
        let tier = MemoryTier::new(100);
        tier.load("a", 60).unwrap();
        let err = tier.load("b", 60);
        assert!(matches!(err, Err(CoreError::InsufficientSpace { .. })));
        assert_eq!(tier.used(), 60);
        assert!(!tier.has("b"));
    }

    #[test]
    fn unload_unknown_segment_not_found() {
        let tier = SsdTier::new(100);
        assert!(matches!(tier.unload("ghost"), Err(CoreError::NotFound(_))));
    }

    #[test]
    fn used_equals_sum_of_resident_sizes() {
        let tier = ObjectTier::new(1000);
        tier.load("a", 100).unwrap();
        tier.load("b", 200).unwrap();
        assert_eq!(tier.used(), 300);
        tier.unload("a").unwrap();
        assert_eq!(tier.used(), 200);
        assert_eq!(tier.available(), 800);
    }

    #[test]
    fn get_type_matches_variant() {
        assert_eq!(MemoryTier::new(1).get_type(), Tier::Hot);
        assert_eq!(SsdTier::new(1).get_type(), Tier::Warm);
        assert_eq!(ObjectTier::new(1).get_type(), Tier::Cold);
    }
}
