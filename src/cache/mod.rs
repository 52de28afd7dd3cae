//! Menu cache system.
//!
//! An in-process TTL cache in front of the menu record source:
//!
//! - **Store**: `TtlCache`, a keyed map with lazy per-entry expiry
//! - **Keys**: `menu:groups` and `menu:sections:<groupId>`
//! - **Invalidation**: events are turned into an `InvalidationPlan` that
//!   follows the cascade table (a dropped section snapshot also drops the
//!   `groups` aggregate) and applied by `CacheTrigger`
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! groups_ttl_seconds = 3600
//! sections_ttl_seconds = 3600
//! ```

mod config;
mod events;
mod keys;
mod lock;
mod planner;
mod store;
mod trigger;

pub use config::{CacheConfig, DEFAULT_TTL};
pub use events::InvalidationEvent;
pub use keys::{KeyFamily, MenuCacheKey};
pub use planner::{InvalidationPlan, dependents_of};
pub use store::{CacheEntry, CachedMenu, MenuCache, TtlCache};
pub use trigger::{CacheTrigger, InvalidationOutcome};
