//! Cache trigger service.
//!
//! The only mutation entry point of the menu cache: turns invalidation
//! events into a plan and applies it.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, info};

use super::events::InvalidationEvent;
use super::keys::MenuCacheKey;
use super::planner::InvalidationPlan;
use super::store::MenuCache;

const METRIC_CACHE_INVALIDATE: &str = "menu_cache_invalidate_total";

/// Outcome of applying an invalidation plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationOutcome {
    /// Keys that were present and got dropped.
    pub dropped: Vec<MenuCacheKey>,
    /// Whether the cache was cleared entirely.
    pub cleared: bool,
}

/// Applies invalidation events to the shared menu cache.
///
/// Over-invalidation is acceptable; serving stale nested data is not, so a
/// category change always drops its whole group and the `groups` aggregate.
#[derive(Clone)]
pub struct CacheTrigger {
    cache: Arc<MenuCache>,
}

impl CacheTrigger {
    pub fn new(cache: Arc<MenuCache>) -> Self {
        Self { cache }
    }

    /// Drop `sections:<group_id>` and everything that embeds it.
    pub fn group_changed(&self, group_id: &str) -> InvalidationOutcome {
        self.apply(&[InvalidationEvent::group_changed(group_id)])
    }

    /// Drop every cached entry.
    pub fn catalog_reset(&self) -> InvalidationOutcome {
        self.apply(&[InvalidationEvent::CatalogReset])
    }

    pub fn apply(&self, events: &[InvalidationEvent]) -> InvalidationOutcome {
        let plan = InvalidationPlan::from_events(events);
        if plan.is_empty() {
            debug!("Cache invalidation skipped: empty plan");
            return InvalidationOutcome::default();
        }

        let outcome = self.execute(&plan);

        info!(
            events = ?events.iter().map(ToString::to_string).collect::<Vec<_>>(),
            plan = %plan,
            dropped = ?outcome.dropped.iter().map(ToString::to_string).collect::<Vec<_>>(),
            cleared = outcome.cleared,
            "Menu cache invalidated"
        );
        counter!(
            METRIC_CACHE_INVALIDATE,
            "scope" => if outcome.cleared { "all" } else { "keys" }
        )
        .increment(1);

        outcome
    }

    fn execute(&self, plan: &InvalidationPlan) -> InvalidationOutcome {
        if plan.clear_all {
            let mut dropped = self.cache.keys();
            dropped.sort();
            self.cache.clear();
            return InvalidationOutcome {
                dropped,
                cleared: true,
            };
        }

        let mut targets: Vec<MenuCacheKey> = plan.keys.iter().cloned().collect();
        targets.sort();

        let dropped = targets
            .into_iter()
            .filter(|key| self.cache.invalidate(key))
            .collect();

        InvalidationOutcome {
            dropped,
            cleared: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::config::DEFAULT_TTL;

    fn warmed_trigger() -> (CacheTrigger, Arc<MenuCache>) {
        let cache = Arc::new(MenuCache::menu());
        cache.set_groups(Vec::new(), DEFAULT_TTL);
        cache.set_sections("baby", Vec::new(), DEFAULT_TTL);
        cache.set_sections("toddler", Vec::new(), DEFAULT_TTL);
        (CacheTrigger::new(Arc::clone(&cache)), cache)
    }

    #[test]
    fn group_changed_drops_sections_and_groups() {
        let (trigger, cache) = warmed_trigger();

        let outcome = trigger.group_changed("baby");

        assert_eq!(
            outcome.dropped,
            vec![MenuCacheKey::Groups, MenuCacheKey::sections("baby")]
        );
        assert!(!cache.has(&MenuCacheKey::Groups));
        assert!(!cache.has(&MenuCacheKey::sections("baby")));
        assert!(cache.has(&MenuCacheKey::sections("toddler")));
    }

    #[test]
    fn group_changed_for_unknown_group_is_idempotent() {
        let (trigger, cache) = warmed_trigger();

        let first = trigger.group_changed("nonexistent");
        let second = trigger.group_changed("nonexistent");

        assert_eq!(first.dropped, vec![MenuCacheKey::Groups]);
        assert!(second.dropped.is_empty());
        assert_eq!(cache.size(), 2);
    }

    #[test]
    fn catalog_reset_clears_everything_twice_without_error() {
        let (trigger, cache) = warmed_trigger();

        let first = trigger.catalog_reset();
        assert!(first.cleared);
        assert_eq!(first.dropped.len(), 3);
        assert_eq!(cache.size(), 0);

        let second = trigger.catalog_reset();
        assert!(second.cleared);
        assert!(second.dropped.is_empty());
        assert_eq!(cache.size(), 0);
    }
}
