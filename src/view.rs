//! Per-frame views derived from a nested table.

use crate::continent::ContinentLookup;
use crate::nest::Nest;
use crate::record::Key;
use std::collections::BTreeMap;

/// Leaf categories every water chart needs.
pub const WATER_REQUIRED: &[&str] = &["GDP", "Rural", "Urban"];

/// Trade charts read their own flows; nothing is required up front.
pub const TRADE_REQUIRED: &[&str] = &[];

/// One entity (a country) and its leaf values for the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    pub key: String,
    pub value: BTreeMap<String, f64>,
}

impl EntityView {
    pub fn get(&self, category: &str) -> Option<f64> {
        self.value.get(category).copied()
    }

    pub fn has(&self, category: &str) -> bool {
        self.value.contains_key(category)
    }
}

/// Entities below `path`, keeping only those carrying every `required` leaf.
pub fn select(table: &Nest, path: &[Key], required: &[&str]) -> Vec<EntityView> {
    let Some(node) = table.get_path(path) else {
        tracing::debug!(path = ?path, "selection not present in table");
        return Vec::new();
    };

    node.entries()
        .filter(|(_, leaves)| required.iter().all(|r| leaves.has(r)))
        .map(|(key, leaves)| EntityView {
            key: key.to_string(),
            value: leaves
                .entries()
                .filter_map(|(k, v)| v.value().map(|v| (k.to_string(), v)))
                .collect(),
        })
        .collect()
}

pub fn select_year(table: &Nest, year: i64, required: &[&str]) -> Vec<EntityView> {
    select(table, &[Key::Num(year)], required)
}

/// Case-insensitive substring match on the entity key.
pub fn filter_by_text(view: Vec<EntityView>, text: &str) -> Vec<EntityView> {
    if text.is_empty() {
        return view;
    }
    let needle = text.to_lowercase();
    view.into_iter()
        .filter(|e| e.key.to_lowercase().contains(&needle))
        .collect()
}

/// Keep entities whose continent is enabled in `filter`.
pub fn filter_by_category(
    view: Vec<EntityView>,
    lookup: &ContinentLookup,
    filter: &ContinentFilter,
) -> Vec<EntityView> {
    view.into_iter()
        .filter(|e| lookup.get(&e.key).is_some_and(|c| filter.is_enabled(c)))
        .collect()
}

/// Which continents are shown. Continents never registered count as hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContinentFilter {
    enabled: BTreeMap<String, bool>,
}

impl ContinentFilter {
    pub fn all_enabled<'a>(continents: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            enabled: continents.into_iter().map(|c| (c.to_string(), true)).collect(),
        }
    }

    pub fn is_enabled(&self, continent: &str) -> bool {
        self.enabled.get(continent).copied().unwrap_or(false)
    }

    pub fn set(&mut self, continent: &str, enabled: bool) {
        if let Some(state) = self.enabled.get_mut(continent) {
            *state = enabled;
        }
    }

    /// Flip a registered continent and return its new state. Continents the
    /// filter was not built with stay hidden.
    pub fn toggle(&mut self, continent: &str) -> Option<bool> {
        let enabled = self.enabled.get_mut(continent)?;
        *enabled = !*enabled;
        Some(*enabled)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.enabled.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
