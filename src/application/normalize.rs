//! Translation of raw storage records into the public menu shapes.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

use crate::application::repos::{RawRecord, SourceError};
use crate::domain::menu::{DisplayOptions, MenuCategory, MenuGroup, MenuSection};

#[derive(Debug, Deserialize)]
pub(crate) struct GroupRow {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub label: String,
    pub slug: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    image_alt: Option<String>,
    #[serde(default)]
    age_group: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    display_options: Option<DisplayOptionsRow>,
}

/// Display options are stored as a JSON document written by the admin tool.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DisplayOptionsRow {
    #[serde(default)]
    show_in_navbar: Option<bool>,
    #[serde(default)]
    navbar_label: Option<String>,
    #[serde(default)]
    promotional_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SectionRow {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    heading: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize)]
struct CategoryRow {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    name: String,
    slug: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    product_count: Option<i64>,
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(default)]
    sort_order: i32,
    #[serde(default)]
    featured: Option<bool>,
    #[serde(default)]
    promotional_badge: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

impl GroupRow {
    pub fn into_group(self, sections: Vec<MenuSection>) -> MenuGroup {
        let options = self.display_options.unwrap_or_default();
        MenuGroup {
            id: self.id,
            label: self.label,
            slug: self.slug,
            description: self.description,
            image: self.image.unwrap_or_default(),
            image_alt: self.image_alt.unwrap_or_default(),
            age_group: self.age_group.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
            sort_order: self.sort_order,
            display_options: DisplayOptions {
                show_in_navbar: options.show_in_navbar.unwrap_or(false),
                navbar_label: options.navbar_label,
                promotional_text: options.promotional_text,
            },
            sections,
        }
    }
}

impl SectionRow {
    pub fn into_section(self, categories: Vec<MenuCategory>) -> MenuSection {
        MenuSection {
            id: self.id,
            heading: self.heading,
            description: self.description,
            sort_order: self.sort_order,
            categories,
        }
    }
}

impl From<CategoryRow> for MenuCategory {
    fn from(row: CategoryRow) -> Self {
        let product_count = row
            .product_count
            .map(|count| u32::try_from(count.max(0)).unwrap_or(u32::MAX))
            .unwrap_or(0);

        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            product_count,
            is_active: row.is_active.unwrap_or(true),
            sort_order: row.sort_order,
            featured: row.featured.unwrap_or(false),
            promotional_badge: row.promotional_badge,
            image: row.image,
        }
    }
}

pub(crate) fn parse_rows<T: DeserializeOwned>(
    kind: &'static str,
    records: Vec<RawRecord>,
) -> Result<Vec<T>, SourceError> {
    records
        .into_iter()
        .map(|record| {
            serde_json::from_value(Value::Object(record))
                .map_err(|err| SourceError::malformed(kind, err))
        })
        .collect()
}

/// Normalize category records, dropping any inactive entry the source let through.
///
/// A row without `is_active` counts as active; sources are expected to
/// filter on `is_active = true` themselves.
pub(crate) fn normalize_categories(
    records: Vec<RawRecord>,
) -> Result<Vec<MenuCategory>, SourceError> {
    let rows: Vec<CategoryRow> = parse_rows("category", records)?;
    Ok(rows
        .into_iter()
        .map(MenuCategory::from)
        .filter(|category| category.is_active)
        .collect())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}
