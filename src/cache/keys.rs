//! Cache key definitions.
//!
//! Two key families exist: the `groups` aggregate and the per-group
//! `sections:<groupId>` entries it embeds.

use std::fmt;

const KEY_PREFIX: &str = "menu";

/// Key of a cached menu fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MenuCacheKey {
    /// All active groups with their sections attached.
    Groups,
    /// Sections (with categories) of one group, keyed by the group id.
    Sections(String),
}

impl MenuCacheKey {
    pub fn sections(group_id: impl Into<String>) -> Self {
        Self::Sections(group_id.into())
    }

    pub fn family(&self) -> KeyFamily {
        match self {
            MenuCacheKey::Groups => KeyFamily::Groups,
            MenuCacheKey::Sections(_) => KeyFamily::Sections,
        }
    }
}

impl fmt::Display for MenuCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuCacheKey::Groups => write!(f, "{KEY_PREFIX}:groups"),
            MenuCacheKey::Sections(group_id) => write!(f, "{KEY_PREFIX}:sections:{group_id}"),
        }
    }
}

/// Key family, used by the cascade rule table and as a metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    Groups,
    Sections,
}

impl KeyFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyFamily::Groups => "groups",
            KeyFamily::Sections => "sections",
        }
    }

    /// The only key of a single-key family.
    pub fn singleton_key(self) -> Option<MenuCacheKey> {
        match self {
            KeyFamily::Groups => Some(MenuCacheKey::Groups),
            KeyFamily::Sections => None,
        }
    }
}
