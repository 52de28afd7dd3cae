//! Invalidation plan generation.
//!
//! Merges invalidation events into the set of cache keys to drop, following
//! the static cascade rule table below.

use std::collections::HashSet;
use std::fmt;

use super::events::InvalidationEvent;
use super::keys::{KeyFamily, MenuCacheKey};

/// Dropping a key of the left family also drops the key of each listed
/// family. Cascade targets must be single-key families.
const CASCADE_RULES: &[(KeyFamily, &[KeyFamily])] = &[
    (KeyFamily::Sections, &[KeyFamily::Groups]),
    (KeyFamily::Groups, &[]),
];

/// Families that must also be dropped when a key of `family` is dropped,
/// following rules transitively. The family itself is not included.
pub fn dependents_of(family: KeyFamily) -> Vec<KeyFamily> {
    let mut seen = vec![family];
    let mut pending = vec![family];

    while let Some(current) = pending.pop() {
        let direct = CASCADE_RULES
            .iter()
            .filter(|(source, _)| *source == current)
            .flat_map(|(_, dependents)| dependents.iter().copied());
        for dependent in direct {
            if !seen.contains(&dependent) {
                seen.push(dependent);
                pending.push(dependent);
            }
        }
    }

    seen.retain(|candidate| *candidate != family);
    seen
}

/// What to drop from the cache for a batch of events.
#[derive(Debug, Default)]
pub struct InvalidationPlan {
    /// Concrete keys to drop.
    pub keys: HashSet<MenuCacheKey>,
    /// Drop everything.
    pub clear_all: bool,
}

impl fmt::Display for InvalidationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InvalidationPlan {{ keys: {}, clear_all: {} }}",
            self.keys.len(),
            self.clear_all,
        )
    }
}

impl InvalidationPlan {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a InvalidationEvent>) -> Self {
        let mut plan = Self::default();

        for event in events {
            match event {
                InvalidationEvent::GroupChanged { group_id } => {
                    plan.drop_key(MenuCacheKey::sections(group_id.as_str()));
                }
                InvalidationEvent::CatalogReset => plan.clear_all = true,
            }
        }

        if plan.clear_all {
            plan.keys.clear();
        }

        plan
    }

    /// Whether `key` is dropped by this plan.
    pub fn covers(&self, key: &MenuCacheKey) -> bool {
        self.clear_all || self.keys.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        !self.clear_all && self.keys.is_empty()
    }

    fn drop_key(&mut self, key: MenuCacheKey) {
        self.keys.extend(
            dependents_of(key.family())
                .into_iter()
                .filter_map(KeyFamily::singleton_key),
        );
        self.keys.insert(key);
    }
}
