//! Catalog menu entities: groups own sections, sections own categories.

use serde::{Deserialize, Serialize};

pub const NAVIGATION_MENU_ID: &str = "main-menu-v1";
pub const NAVIGATION_MENU_NAME: &str = "Main Navigation Menu";
pub const NAVIGATION_MENU_VERSION: &str = "1.0.0";

/// Top-level catalog grouping shown in navigation (for example an age band).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuGroup {
    pub id: String,
    pub label: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub image_alt: String,
    #[serde(default)]
    pub age_group: String,
    pub is_active: bool,
    pub sort_order: i32,
    #[serde(default)]
    pub display_options: DisplayOptions,
    #[serde(default)]
    pub sections: Vec<MenuSection>,
}

impl MenuGroup {
    pub fn visible_in_navbar(&self) -> bool {
        self.is_active && self.display_options.show_in_navbar
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    #[serde(default)]
    pub show_in_navbar: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navbar_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotional_text: Option<String>,
}

/// Named subdivision of a group. Always addressed through its parent group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSection {
    pub id: String,
    pub heading: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sort_order: i32,
    #[serde(default)]
    pub categories: Vec<MenuCategory>,
}

/// Leaf catalog entry with merchandising metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCategory {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub product_count: u32,
    pub is_active: bool,
    pub sort_order: i32,
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotional_badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl MenuCategory {
    /// Case-insensitive substring match against name, description and slug.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|description| description.to_lowercase().contains(needle))
            || self.slug.to_lowercase().contains(needle)
    }
}

/// Envelope returned by the full navigation read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationMenu {
    pub id: String,
    pub name: String,
    pub version: String,
    pub last_updated: String,
    pub groups: Vec<MenuGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_settings: Option<GlobalMenuSettings>,
}

impl NavigationMenu {
    pub fn new(groups: Vec<MenuGroup>, last_updated: String) -> Self {
        let global_settings = (!groups.is_empty()).then(GlobalMenuSettings::default);
        Self {
            id: NAVIGATION_MENU_ID.to_string(),
            name: NAVIGATION_MENU_NAME.to_string(),
            version: NAVIGATION_MENU_VERSION.to_string(),
            last_updated,
            groups,
            global_settings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalMenuSettings {
    pub max_categories_per_section: u32,
    pub show_product_counts: bool,
    pub enable_promotional_badges: bool,
}

impl Default for GlobalMenuSettings {
    fn default() -> Self {
        Self {
            max_categories_per_section: 10,
            show_product_counts: true,
            enable_promotional_badges: true,
        }
    }
}
