//! Cache configuration.
//!
//! Controls whether the menu cache is used and how long each key family lives.

use std::time::Duration;

/// Entries live for one hour unless configured otherwise.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Serve reads from the in-memory cache. When off every read hits the source.
    pub enabled: bool,
    /// TTL of the `groups` aggregate.
    pub groups_ttl: Duration,
    /// TTL of each `sections:<groupId>` entry.
    pub sections_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            groups_ttl: DEFAULT_TTL,
            sections_ttl: DEFAULT_TTL,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            groups_ttl: settings.groups_ttl,
            sections_ttl: settings.sections_ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.groups_ttl, Duration::from_secs(3600));
        assert_eq!(config.sections_ttl, Duration::from_secs(3600));
    }
}
