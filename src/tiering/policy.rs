//! Tiering Policy: classification rules.

use super::types::{SegmentAccessStats, Tier, TieringPolicy};
use std::time::Instant;

/// Determines the tier a segment should occupy given its access stats and
/// the active policy. When tiering is disabled, always returns Hot. A
/// segment that would have landed in a disabled tier falls back to the next
/// hotter tier; a segment that is genuinely Cold-eligible stays Cold
/// regardless of which other tiers are disabled, since Cold itself is never
/// disabled.
pub fn determine_tier(stats: &SegmentAccessStats, policy: &TieringPolicy, now: Instant) -> Tier {
    if !policy.enabled {
        return Tier::Hot;
    }

    let age = now.saturating_duration_since(stats.last_access);

    let hot_eligible =
        policy.hot_enabled && age < policy.hot_threshold && stats.access_count >= policy.hot_access_count_threshold;
    if hot_eligible {
        return Tier::Hot;
    }

    let warm_eligible_ignoring_enabled =
        age < policy.warm_threshold || stats.access_count >= policy.min_access_count;
    if warm_eligible_ignoring_enabled {
        if policy.warm_enabled {
            return Tier::Warm;
        }
        // This segment would have landed in Warm, but Warm is disabled;
        // fall back to the next hotter tier.
        return Tier::Hot;
    }

    Tier::Cold
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn stats_with(access_count: u64, age: Duration) -> SegmentAccessStats {
        let mut s = SegmentAccessStats::new("seg");
        s.access_count = access_count;
        s.last_access = Instant::now() - age;
        s
    }

    #[test]
    fn scenario_tiering_classification() {
        let policy = TieringPolicy::default();
        let now = Instant::now();

        let hot = stats_with(150, Duration::from_secs(10));
        assert_eq!(determine_tier(&hot, &policy, now), Tier::Hot);

        let warm = stats_with(15, Duration::from_secs(10));
        assert_eq!(determine_tier(&warm, &policy, now), Tier::Warm);

        let cold = stats_with(1, Duration::from_secs(10));
        assert_eq!(determine_tier(&cold, &policy, now), Tier::Cold);
    }

    #[test]
    fn disabled_policy_always_hot() {
        let mut policy = TieringPolicy::default();
        policy.enabled = false;
        let stats = stats_with(0, Duration::from_secs(999_999));
        assert_eq!(determine_tier(&stats, &policy, Instant::now()), Tier::Hot);
    }

    #[test]
    fn warm_disabled_falls_back_to_hot() {
        let mut policy = TieringPolicy::default();
        policy.warm_enabled = false;
        let stats = stats_with(15, Duration::from_secs(10));
        assert_eq!(determine_tier(&stats, &policy, Instant::now()), Tier::Hot);
    }

    #[test]
    fn old_and_rarely_accessed_is_cold() {
        let policy = TieringPolicy::default();
        let stats = stats_with(1, Duration::from_secs(48 * 3600));
        assert_eq!(determine_tier(&stats, &policy, Instant::now()), Tier::Cold);
    }

    #[test]
    fn cold_eligible_segment_stays_cold_even_with_warm_disabled() {
        let mut policy = TieringPolicy::default();
        policy.warm_enabled = false;
        let stats = stats_with(1, Duration::from_secs(48 * 3600));
        assert_eq!(determine_tier(&stats, &policy, Instant::now()), Tier::Cold);
    }
}
