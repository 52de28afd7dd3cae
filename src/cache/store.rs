//! TTL cache storage.
//!
//! `TtlCache` is a generic key/value map with per-entry expiry. Expired
//! entries are never swept in the background: they are dropped lazily by the
//! next `get` or `has` that touches them. The map is unbounded.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use metrics::counter;
use tokio::time::Instant;

use crate::domain::menu::{MenuGroup, MenuSection};

use super::config::DEFAULT_TTL;
use super::keys::MenuCacheKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

const METRIC_CACHE_HIT: &str = "menu_cache_hit_total";
const METRIC_CACHE_MISS: &str = "menu_cache_miss_total";
const METRIC_CACHE_EXPIRED: &str = "menu_cache_expired_total";

/// A cached value stamped with its creation time and lifetime.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
        }
    }

    /// An entry is valid while `now - created_at <= ttl`.
    pub fn is_valid_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) <= self.ttl
    }
}

/// Thread-safe key/value store with per-entry TTL.
///
/// Values are cloned out on read, so store cheaply clonable values (the menu
/// cache stores `Arc`s).
pub struct TtlCache<K, V> {
    name: &'static str,
    default_ttl: Duration,
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(name: &'static str, default_ttl: Duration) -> Self {
        Self {
            name,
            default_ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the value if present and unexpired. An expired entry is removed.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        {
            let entries = rw_read(&self.entries, SOURCE, "get");
            match entries.get(key) {
                None => {
                    counter!(METRIC_CACHE_MISS, "cache" => self.name).increment(1);
                    return None;
                }
                Some(entry) if entry.is_valid_at(now) => {
                    counter!(METRIC_CACHE_HIT, "cache" => self.name).increment(1);
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        self.remove_if_expired(key, now);
        counter!(METRIC_CACHE_MISS, "cache" => self.name).increment(1);
        None
    }

    /// Store `value` under `key` with the default TTL, replacing any entry.
    pub fn set(&self, key: K, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        rw_write(&self.entries, SOURCE, "set").insert(key, CacheEntry::new(value, ttl));
    }

    /// Existence check with the same lazy-expiry side effect as `get`.
    pub fn has(&self, key: &K) -> bool {
        let now = Instant::now();
        let valid = match rw_read(&self.entries, SOURCE, "has").get(key) {
            None => return false,
            Some(entry) => entry.is_valid_at(now),
        };

        if !valid {
            self.remove_if_expired(key, now);
        }
        valid
    }

    /// Remove `key` if present. Never fails.
    pub fn invalidate(&self, key: &K) -> bool {
        rw_write(&self.entries, SOURCE, "invalidate")
            .remove(key)
            .is_some()
    }

    pub fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
    }

    /// Number of stored entries, including expired ones not yet touched.
    pub fn size(&self) -> usize {
        rw_read(&self.entries, SOURCE, "size").len()
    }

    pub fn keys(&self) -> Vec<K> {
        rw_read(&self.entries, SOURCE, "keys")
            .keys()
            .cloned()
            .collect()
    }

    // A `set` may have replaced the entry between the read and this write,
    // so the expiry check is repeated under the write lock.
    fn remove_if_expired(&self, key: &K, now: Instant) {
        let mut entries = rw_write(&self.entries, SOURCE, "remove_if_expired");
        if entries.get(key).is_some_and(|entry| !entry.is_valid_at(now)) {
            entries.remove(key);
            counter!(METRIC_CACHE_EXPIRED, "cache" => self.name).increment(1);
        }
    }
}

// ============================================================================
// Menu cache
// ============================================================================

/// Values held by the menu cache. Shared immutably; readers get copies.
#[derive(Debug, Clone)]
pub enum CachedMenu {
    Groups(Arc<Vec<MenuGroup>>),
    Sections(Arc<Vec<MenuSection>>),
}

pub type MenuCache = TtlCache<MenuCacheKey, CachedMenu>;

impl TtlCache<MenuCacheKey, CachedMenu> {
    pub fn menu() -> Self {
        Self::new("menu", DEFAULT_TTL)
    }

    pub fn get_groups(&self) -> Option<Vec<MenuGroup>> {
        match self.get(&MenuCacheKey::Groups)? {
            CachedMenu::Groups(groups) => Some(groups.as_ref().clone()),
            CachedMenu::Sections(_) => None,
        }
    }

    pub fn set_groups(&self, groups: Vec<MenuGroup>, ttl: Duration) {
        self.set_with_ttl(MenuCacheKey::Groups, CachedMenu::Groups(Arc::new(groups)), ttl);
    }

    pub fn get_sections(&self, group_id: &str) -> Option<Vec<MenuSection>> {
        match self.get(&MenuCacheKey::sections(group_id))? {
            CachedMenu::Sections(sections) => Some(sections.as_ref().clone()),
            CachedMenu::Groups(_) => None,
        }
    }

    pub fn set_sections(&self, group_id: &str, sections: Vec<MenuSection>, ttl: Duration) {
        self.set_with_ttl(
            MenuCacheKey::sections(group_id),
            CachedMenu::Sections(Arc::new(sections)),
            ttl,
        );
    }
}
