//! Lookup table that harmonizes free-form category tags into a two-level
//! [`Category`].

use super::text::{normalize_tag, strip_language_prefix};
use crate::model::{Category, MultiValue};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Broad and sub category a tag maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryEntry {
    pub broad: String,
    pub sub: String,
}

/// Ordered tag -> category lookup.
///
/// Keys are stored lowercased. A record tag matches a key either verbatim
/// (`en:yogurts`) or with its language prefix removed (`yogurts`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMap {
    entries: IndexMap<String, CategoryEntry>,
}

impl CategoryMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map with the built-in food taxonomy
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut map = Self::new();
        map.load_builtins();
        map
    }

    fn load_builtins(&mut self) {
        const BUILTIN: &[(&str, &str, &str)] = &[
            // Dairy
            ("dairies", "Dairy", "Dairy"),
            ("milks", "Dairy", "Milk"),
            ("yogurts", "Dairy", "Yogurts"),
            ("fruit-yogurts", "Dairy", "Fruit Yogurts"),
            ("cheeses", "Dairy", "Cheese"),
            ("dairy-desserts", "Dairy", "Dairy Desserts"),
            ("butters", "Dairy", "Butter"),
            // Beverages
            ("beverages", "Beverages", "Beverages"),
            ("juices-and-nectars", "Beverages", "Juices"),
            ("fruit-juices", "Beverages", "Juices"),
            ("sodas", "Beverages", "Soft Drinks"),
            ("waters", "Beverages", "Water"),
            ("plant-based-milk-alternatives", "Beverages", "Plant-Based Drinks"),
            ("coffees", "Beverages", "Coffee"),
            ("teas", "Beverages", "Tea"),
            // Cereals
            ("cereals-and-potatoes", "Cereals", "Cereals"),
            ("breakfast-cereals", "Cereals", "Breakfast Cereals"),
            ("pastas", "Cereals", "Pasta"),
            ("rices", "Cereals", "Rice"),
            ("breads", "Bakery", "Bread"),
            ("viennoiseries", "Bakery", "Pastries"),
            // Snacks
            ("snacks", "Snacks", "Snacks"),
            ("sweet-snacks", "Snacks", "Sweet Snacks"),
            ("biscuits", "Snacks", "Biscuits"),
            ("chocolates", "Snacks", "Chocolate"),
            ("confectioneries", "Snacks", "Confectionery"),
            ("salty-snacks", "Snacks", "Salty Snacks"),
            ("crisps", "Snacks", "Crisps"),
            ("nuts", "Snacks", "Nuts"),
            // Meat and fish
            ("meats", "Meat", "Meat"),
            ("prepared-meats", "Meat", "Processed Meat"),
            ("hams", "Meat", "Ham"),
            ("sausages", "Meat", "Sausages"),
            ("poultries", "Meat", "Poultry"),
            ("seafood", "Fish", "Seafood"),
            ("fishes", "Fish", "Fish"),
            ("canned-fishes", "Fish", "Canned Fish"),
            // Meals and frozen
            ("meals", "Prepared Meals", "Meals"),
            ("pizzas", "Prepared Meals", "Pizza"),
            ("soups", "Prepared Meals", "Soups"),
            ("frozen-foods", "Frozen", "Frozen"),
            ("ice-creams", "Frozen", "Ice Cream"),
            // Pantry
            ("condiments", "Condiments", "Condiments"),
            ("sauces", "Condiments", "Sauces"),
            ("spreads", "Spreads", "Spreads"),
            ("sweet-spreads", "Spreads", "Sweet Spreads"),
            ("jams", "Spreads", "Jams"),
            ("fats", "Fats & Oils", "Fats"),
            ("vegetable-oils", "Fats & Oils", "Vegetable Oils"),
            ("olive-oils", "Fats & Oils", "Olive Oil"),
            ("desserts", "Desserts", "Desserts"),
            // Produce
            ("fruits", "Fruit & Vegetables", "Fruit"),
            ("vegetables", "Fruit & Vegetables", "Vegetables"),
            ("legumes", "Legumes", "Legumes"),
        ];

        for (tag, broad, sub) in BUILTIN {
            self.insert(tag, broad, sub);
        }
    }

    /// Add or replace the entry for `tag`.
    pub fn insert(&mut self, tag: &str, broad: &str, sub: &str) {
        if let Some(key) = normalize_tag(tag) {
            self.entries.insert(
                key,
                CategoryEntry {
                    broad: broad.to_string(),
                    sub: sub.to_string(),
                },
            );
        }
    }

    /// Replace the table with the YAML mapping `tag: {broad, sub}` at `path`.
    pub fn from_yaml_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::OpportunityError::io(path, e))?;
        Self::from_yaml_str(&content)
            .map_err(|e| crate::OpportunityError::config(format!("{}: {e}", path.display())))
    }

    /// Parse a YAML mapping `tag: {broad, sub}`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let raw: IndexMap<String, CategoryEntry> = serde_yaml::from_str(yaml)?;
        let mut map = Self::new();
        for (tag, entry) in raw {
            map.insert(&tag, &entry.broad, &entry.sub);
        }
        Ok(map)
    }

    /// Entry for a single record tag.
    #[must_use]
    pub fn lookup(&self, tag: &str) -> Option<&CategoryEntry> {
        let tag = tag.trim().to_lowercase();
        self.entries
            .get(&tag)
            .or_else(|| self.entries.get(strip_language_prefix(&tag)))
    }

    /// First mapped tag gives the broad level, last mapped tag the sub level.
    #[must_use]
    pub fn harmonize(&self, tags: &MultiValue) -> Category {
        let mut mapped = tags.iter().filter_map(|t| self.lookup(t));
        let Some(first) = mapped.next() else {
            return Category::unknown();
        };
        let last = mapped.last().unwrap_or(first);
        Category::new(first.broad.clone(), last.sub.clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harmonize_first_and_last_mapped() {
        let map = CategoryMap::with_builtins();
        let tags = MultiValue::from_delimited("en:dairies,en:fermented-foods,en:yogurts,en:fruit-yogurts");
        assert_eq!(map.harmonize(&tags), Category::new("Dairy", "Fruit Yogurts"));
    }

    #[test]
    fn test_harmonize_unmapped_is_unknown() {
        let map = CategoryMap::with_builtins();
        let tags = MultiValue::from_delimited("en:mystery-things");
        assert!(map.harmonize(&tags).is_unknown());
        assert!(map.harmonize(&MultiValue::default()).is_unknown());
    }

    #[test]
    fn test_single_mapped_tag_gives_both_levels() {
        let map = CategoryMap::with_builtins();
        let tags = MultiValue::from_delimited("en:unmapped,en:biscuits");
        assert_eq!(map.harmonize(&tags), Category::new("Snacks", "Biscuits"));
    }

    #[test]
    fn test_prefixed_key_matches_verbatim_only() {
        let mut map = CategoryMap::new();
        map.insert("fr:yaourts", "Dairy", "Yogurts");
        assert!(map.lookup("FR:Yaourts").is_some());
        assert!(map.lookup("yaourts").is_none());
    }

    #[test]
    fn test_from_yaml_str() {
        let yaml = "en:cookies:\n  broad: Snacks\n  sub: Cookies\n";
        let map = CategoryMap::from_yaml_str(yaml).expect("valid yaml");
        assert_eq!(map.len(), 1);
        let tags = MultiValue::from_delimited("en:cookies");
        assert_eq!(map.harmonize(&tags), Category::new("Snacks", "Cookies"));
    }
}
