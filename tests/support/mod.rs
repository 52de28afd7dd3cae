//! In-memory record source used by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use storefront_menu::application::repos::{RawRecord, RecordQuery, RecordSource, SourceError};

#[derive(Default)]
pub struct StubSource {
    groups: Mutex<Vec<RawRecord>>,
    sections: Mutex<HashMap<String, Vec<RawRecord>>>,
    categories: Mutex<HashMap<String, Vec<RawRecord>>>,
    failing: Mutex<HashSet<String>>,
    delays: Mutex<HashMap<String, Duration>>,
    fail_everything: Mutex<bool>,
    calls: AtomicUsize,
    log: Mutex<Vec<String>>,
}

pub fn record(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

pub fn group_record(id: &str, sort_order: i32, is_active: bool, show_in_navbar: bool) -> RawRecord {
    record(json!({
        "id": id,
        "label": id.to_uppercase(),
        "slug": id,
        "description": null,
        "image": format!("/images/{id}.jpg"),
        "image_alt": format!("{id} collection"),
        "age_group": "all",
        "is_active": is_active,
        "sort_order": sort_order,
        "display_options": { "showInNavbar": show_in_navbar }
    }))
}

pub fn section_record(id: &str, sort_order: i32) -> RawRecord {
    record(json!({
        "id": id,
        "heading": format!("Heading {id}"),
        "description": null,
        "sort_order": sort_order
    }))
}

pub fn category_record(id: &str, name: &str, sort_order: i32, featured: bool) -> RawRecord {
    record(json!({
        "id": id,
        "name": name,
        "slug": name.to_lowercase().replace(' ', "-"),
        "description": null,
        "product_count": null,
        "is_active": true,
        "sort_order": sort_order,
        "featured": featured,
        "promotional_badge": null,
        "image": null
    }))
}

impl StubSource {
    /// Three groups (`baby`, `toddler`, `kids`), one section each.
    pub fn catalog() -> Self {
        let source = Self::default();
        source.set_groups(vec![
            group_record("toddler", 2, true, true),
            group_record("baby", 1, true, true),
            group_record("kids", 3, true, false),
        ]);
        source.set_sections("baby", vec![section_record("s-baby", 0)]);
        source.set_sections("toddler", vec![section_record("s-toddler", 0)]);
        source.set_sections("kids", vec![section_record("s-kids", 0)]);
        source.set_categories(
            "s-baby",
            vec![
                category_record("c-bodysuits", "Bodysuits", 1, true),
                category_record("c-sleep", "Sleep Sacks", 0, false),
            ],
        );
        source.set_categories(
            "s-toddler",
            vec![category_record("c-jackets", "Jackets", 0, true)],
        );
        source.set_categories("s-kids", vec![category_record("c-shoes", "Shoes", 0, false)]);
        source
    }

    pub fn set_groups(&self, groups: Vec<RawRecord>) {
        *self.groups.lock().unwrap() = groups;
    }

    pub fn set_sections(&self, group_id: &str, sections: Vec<RawRecord>) {
        self.sections
            .lock()
            .unwrap()
            .insert(group_id.to_string(), sections);
    }

    pub fn set_categories(&self, section_id: &str, categories: Vec<RawRecord>) {
        self.categories
            .lock()
            .unwrap()
            .insert(section_id.to_string(), categories);
    }

    /// Fail the query whose rendered form is `query` (e.g. `sections-of-group(baby)`).
    pub fn fail(&self, query: &str) {
        self.failing.lock().unwrap().insert(query.to_string());
    }

    pub fn recover(&self, query: &str) {
        self.failing.lock().unwrap().remove(query);
    }

    pub fn fail_everything(&self) {
        *self.fail_everything.lock().unwrap() = true;
    }

    pub fn delay(&self, query: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(query.to_string(), delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn reset_log(&self) {
        self.log.lock().unwrap().clear();
    }
}

#[async_trait]
impl RecordSource for StubSource {
    async fn fetch(&self, query: RecordQuery) -> Result<Vec<RawRecord>, SourceError> {
        let rendered = query.to_string();
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(rendered.clone());

        let delay = self.delays.lock().unwrap().get(&rendered).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.fail_everything.lock().unwrap() || self.failing.lock().unwrap().contains(&rendered)
        {
            return Err(SourceError::query(&query, "stubbed failure"));
        }

        let records = match &query {
            RecordQuery::ActiveGroups => self.groups.lock().unwrap().clone(),
            RecordQuery::SectionsOfGroup(group_id) => self
                .sections
                .lock()
                .unwrap()
                .get(group_id)
                .cloned()
                .unwrap_or_default(),
            RecordQuery::ActiveCategoriesOfSection(section_id) => self
                .categories
                .lock()
                .unwrap()
                .get(section_id)
                .cloned()
                .unwrap_or_default(),
        };
        Ok(records)
    }
}
