//! Derived navigation views over the assembled menu tree.

use std::collections::HashSet;

use crate::application::menu::MenuService;
use crate::domain::menu::{MenuCategory, MenuGroup};

/// Keep groups flagged for the navbar, ordered by `sort_order` (stable).
pub fn navbar_view(groups: Vec<MenuGroup>) -> Vec<MenuGroup> {
    let mut visible: Vec<MenuGroup> = groups
        .into_iter()
        .filter(MenuGroup::visible_in_navbar)
        .collect();
    visible.sort_by_key(|group| group.sort_order);
    visible
}

/// Featured categories in tree order, first occurrence of each id wins.
pub fn featured_in(groups: &[MenuGroup]) -> Vec<MenuCategory> {
    let mut seen = HashSet::new();
    categories_of(groups)
        .filter(|category| category.featured && seen.insert(category.id.as_str()))
        .cloned()
        .collect()
}

/// Categories whose name, description or slug contain `query`, ignoring case.
pub fn search_in(groups: &[MenuGroup], query: &str) -> Vec<MenuCategory> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    categories_of(groups)
        .filter(|category| category.matches(&needle) && seen.insert(category.id.as_str()))
        .cloned()
        .collect()
}

fn categories_of(groups: &[MenuGroup]) -> impl Iterator<Item = &MenuCategory> {
    groups
        .iter()
        .flat_map(|group| group.sections.iter())
        .flat_map(|section| section.categories.iter())
}

impl MenuService {
    pub async fn navbar_groups(&self) -> Vec<MenuGroup> {
        navbar_view(self.groups_fast().await)
    }

    pub async fn featured_categories(&self) -> Vec<MenuCategory> {
        featured_in(&self.groups_fast().await)
    }

    pub async fn search_categories(&self, query: &str) -> Vec<MenuCategory> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        search_in(&self.groups_fast().await, query)
    }
}
