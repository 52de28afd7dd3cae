//! Menu hierarchy assembly.
//!
//! `MenuService` builds the group → sections → categories tree from the
//! record source, reading and repopulating the menu cache per node. Every
//! public read is fail-soft: source failures are logged, counted and turned
//! into an empty result.

use std::sync::Arc;

use futures::future::join_all;
use metrics::{counter, histogram};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::application::normalize::{GroupRow, SectionRow, normalize_categories, parse_rows};
use crate::application::repos::{RecordQuery, RecordSource, SourceError};
use crate::cache::{CacheConfig, CacheTrigger, InvalidationOutcome, MenuCache};
use crate::domain::menu::{MenuGroup, MenuSection, NavigationMenu};

const SOURCE: &str = "application::menu";

const METRIC_SOURCE_FAILURE: &str = "menu_source_failure_total";
const METRIC_ASSEMBLE_MS: &str = "menu_assemble_ms";

/// Rendered view of the cache for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CacheSnapshot {
    pub size: usize,
    pub keys: Vec<String>,
}

#[derive(Clone)]
pub struct MenuService {
    source: Option<Arc<dyn RecordSource>>,
    cache: Arc<MenuCache>,
    config: CacheConfig,
    trigger: CacheTrigger,
}

impl MenuService {
    pub fn new(
        source: Option<Arc<dyn RecordSource>>,
        cache: Arc<MenuCache>,
        config: CacheConfig,
    ) -> Self {
        let trigger = CacheTrigger::new(Arc::clone(&cache));
        Self {
            source,
            cache,
            config,
            trigger,
        }
    }

    /// Whether a record source is wired in. Without one every read is empty.
    pub fn source_configured(&self) -> bool {
        self.source.is_some()
    }

    pub fn cache(&self) -> &Arc<MenuCache> {
        &self.cache
    }

    /// All active groups with their sections, ordered by `sort_order`.
    pub async fn groups_fast(&self) -> Vec<MenuGroup> {
        self.try_groups_fast()
            .await
            .unwrap_or_else(|err| self.fail_soft("groups_fast", None, err))
    }

    /// Sections of one group with their active categories.
    pub async fn group_sections(&self, group_id: &str) -> Vec<MenuSection> {
        self.try_group_sections(group_id)
            .await
            .unwrap_or_else(|err| self.fail_soft("group_sections", Some(group_id), err))
    }

    /// The group tree wrapped in the navigation menu envelope.
    pub async fn navigation_menu(&self) -> NavigationMenu {
        let groups = self.groups_fast().await;
        let last_updated = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|err| {
                warn!(target = SOURCE, error = %err, "Failed to format menu timestamp");
                String::new()
            });
        NavigationMenu::new(groups, last_updated)
    }

    /// Drop a group's sections and the aggregate that embeds them.
    pub fn invalidate_group(&self, group_id: &str) -> InvalidationOutcome {
        self.trigger.group_changed(group_id)
    }

    pub fn invalidate_all(&self) -> InvalidationOutcome {
        self.trigger.catalog_reset()
    }

    pub fn cache_snapshot(&self) -> CacheSnapshot {
        let mut keys: Vec<String> = self.cache.keys().iter().map(ToString::to_string).collect();
        keys.sort();
        CacheSnapshot {
            size: self.cache.size(),
            keys,
        }
    }

    async fn try_groups_fast(&self) -> Result<Vec<MenuGroup>, SourceError> {
        if self.config.enabled
            && let Some(groups) = self.cache.get_groups()
        {
            return Ok(groups);
        }

        let started = Instant::now();
        let source = self.source()?;

        let mut rows: Vec<GroupRow> =
            parse_rows("group", source.fetch(RecordQuery::ActiveGroups).await?)?;
        rows.sort_by_key(|row| row.sort_order);

        let fetched = join_all(rows.iter().map(|row| self.try_group_sections(&row.id))).await;

        let mut degraded = false;
        let groups: Vec<MenuGroup> = rows
            .into_iter()
            .zip(fetched)
            .map(|(row, sections)| {
                let sections = sections.unwrap_or_else(|err| {
                    degraded = true;
                    self.fail_soft("group_sections", Some(row.id.as_str()), err)
                });
                row.into_group(sections)
            })
            .collect();

        // A tree with a failed group is served once but never pinned.
        if self.config.enabled && !degraded {
            self.cache.set_groups(groups.clone(), self.config.groups_ttl);
        }

        histogram!(METRIC_ASSEMBLE_MS).record(started.elapsed().as_secs_f64() * 1000.0);
        debug!(
            target = SOURCE,
            groups = groups.len(),
            degraded,
            "Assembled menu tree"
        );
        Ok(groups)
    }

    async fn try_group_sections(&self, group_id: &str) -> Result<Vec<MenuSection>, SourceError> {
        if self.config.enabled
            && let Some(sections) = self.cache.get_sections(group_id)
        {
            return Ok(sections);
        }

        let source = self.source()?;

        let mut rows: Vec<SectionRow> = parse_rows(
            "section",
            source
                .fetch(RecordQuery::SectionsOfGroup(group_id.to_string()))
                .await?,
        )?;
        rows.sort_by_key(|row| row.sort_order);

        let mut sections = Vec::with_capacity(rows.len());
        for row in rows {
            let records = source
                .fetch(RecordQuery::ActiveCategoriesOfSection(row.id.clone()))
                .await?;
            let mut categories = normalize_categories(records)?;
            categories.sort_by_key(|category| category.sort_order);
            sections.push(row.into_section(categories));
        }

        if self.config.enabled {
            self.cache
                .set_sections(group_id, sections.clone(), self.config.sections_ttl);
        }
        Ok(sections)
    }

    fn source(&self) -> Result<&Arc<dyn RecordSource>, SourceError> {
        self.source.as_ref().ok_or(SourceError::Unavailable)
    }

    fn fail_soft<T>(
        &self,
        operation: &'static str,
        group_id: Option<&str>,
        err: SourceError,
    ) -> Vec<T> {
        counter!(METRIC_SOURCE_FAILURE, "operation" => operation).increment(1);
        match err {
            SourceError::Unavailable => debug!(
                target = SOURCE,
                operation,
                group_id,
                "Menu source unavailable; serving empty result"
            ),
            err => warn!(
                target = SOURCE,
                operation,
                group_id,
                error = %err,
                "Menu source failed; serving empty result"
            ),
        }
        Vec::new()
    }
}
