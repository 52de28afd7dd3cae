//! Domain events that require cache invalidation.

use std::fmt;

/// Out-of-band catalog changes reported by the admin side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationEvent {
    /// A group's sections or categories changed.
    GroupChanged { group_id: String },
    /// The whole catalog must be reloaded.
    CatalogReset,
}

impl InvalidationEvent {
    pub fn group_changed(group_id: impl Into<String>) -> Self {
        Self::GroupChanged {
            group_id: group_id.into(),
        }
    }
}

impl fmt::Display for InvalidationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidationEvent::GroupChanged { group_id } => write!(f, "group_changed({group_id})"),
            InvalidationEvent::CatalogReset => f.write_str("catalog_reset"),
        }
    }
}
