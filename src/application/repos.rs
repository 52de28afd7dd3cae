//! Record source contract consumed by the menu assembler.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// A raw record as returned by the backing store, keyed by storage column names.
pub type RawRecord = Map<String, Value>;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("record source unavailable")]
    Unavailable,
    #[error("query `{query}` failed: {message}")]
    Query { query: &'static str, message: String },
    #[error("malformed {kind} record: {message}")]
    Malformed { kind: &'static str, message: String },
}

impl SourceError {
    pub fn query(query: &RecordQuery, err: impl fmt::Display) -> Self {
        Self::Query {
            query: query.name(),
            message: err.to_string(),
        }
    }

    pub fn malformed(kind: &'static str, err: impl fmt::Display) -> Self {
        Self::Malformed {
            kind,
            message: err.to_string(),
        }
    }
}

/// Entity kind plus optional parent key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordQuery {
    /// Active groups ordered by sort order.
    ActiveGroups,
    /// Sections owned by a group, ordered by sort order.
    SectionsOfGroup(String),
    /// Active categories owned by a section, ordered by sort order.
    ActiveCategoriesOfSection(String),
}

impl RecordQuery {
    pub fn name(&self) -> &'static str {
        match self {
            RecordQuery::ActiveGroups => "groups",
            RecordQuery::SectionsOfGroup(_) => "sections-of-group",
            RecordQuery::ActiveCategoriesOfSection(_) => "categories-of-section",
        }
    }

    pub fn parent_key(&self) -> Option<&str> {
        match self {
            RecordQuery::ActiveGroups => None,
            RecordQuery::SectionsOfGroup(id) | RecordQuery::ActiveCategoriesOfSection(id) => {
                Some(id.as_str())
            }
        }
    }
}

impl fmt::Display for RecordQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parent_key() {
            Some(parent) => write!(f, "{}({parent})", self.name()),
            None => f.write_str(self.name()),
        }
    }
}

/// Backing store returning ordered child records for a query.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(&self, query: RecordQuery) -> Result<Vec<RawRecord>, SourceError>;
}
