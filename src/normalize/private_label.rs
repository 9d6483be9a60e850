//! Known private-label brands per retailer.

use super::text::normalize_brand;
use crate::model::RecordSource;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Retailer-owned brand names, keyed by retailer id.
///
/// Brands are stored in normalized form (see [`normalize_brand`]) so a lookup
/// with an already-normalized brand is an exact set membership test. Every
/// registered brand also joins the cross-retailer set used for reference
/// records, which carry no retailer of their own.
#[derive(Debug, Clone, Default)]
pub struct PrivateLabelRegistry {
    by_retailer: HashMap<String, HashSet<String>>,
    cross_retailer: HashSet<String>,
}

impl PrivateLabelRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in brand lists
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.load_builtins();
        registry
    }

    fn load_builtins(&mut self) {
        self.add_brands(
            "mercadona",
            &[
                "hacendado", "deliplus", "bosque verde", "compy", "tododia", "solcare", "dermik",
                "cave", "belsia", "alesto", "mercadona", "esencia", "dulcesol", "casa juncal",
                "polesa", "quirus", "steinburg", "el pozo", "dia",
            ],
        );
        self.add_brands(
            "albert_heijn",
            &["ah", "ah biologisch", "ah excellent", "ah terra", "ah basic"],
        );
        self.add_brands(
            "carrefour",
            &[
                "carrefour", "carrefour bio", "carrefour classic", "carrefour extra", "simpl",
                "carrefour veggie", "carrefour no gluten",
            ],
        );
        self.add_brands(
            "lidl",
            &["milbona", "cien", "w5", "freeway", "crownfield", "chef select", "deluxe", "pilos"],
        );
        self.add_brands("jumbo", &["jumbo"]);
    }

    /// Register private-label brands for `retailer`.
    pub fn add_brands<S: AsRef<str>>(&mut self, retailer: &str, brands: &[S]) {
        let set = self
            .by_retailer
            .entry(retailer.trim().to_lowercase())
            .or_default();
        for brand in brands.iter().filter_map(|b| normalize_brand(b.as_ref())) {
            set.insert(brand.clone());
            self.cross_retailer.insert(brand);
        }
    }

    /// Whether `brand` (already normalized) is a private label for the
    /// record's source.
    #[must_use]
    pub fn is_private_label(&self, source: &RecordSource, brand: Option<&str>) -> bool {
        let Some(brand) = brand else {
            return false;
        };
        match source {
            RecordSource::Reference => self.cross_retailer.contains(brand),
            RecordSource::Retailer { retailer, .. } => self
                .by_retailer
                .get(&retailer.to_lowercase())
                .is_some_and(|set| set.contains(brand)),
        }
    }

    /// Number of known brands per retailer, sorted by retailer id.
    #[must_use]
    pub fn summary(&self) -> BTreeMap<&str, usize> {
        self.by_retailer
            .iter()
            .map(|(retailer, brands)| (retailer.as_str(), brands.len()))
            .collect()
    }
}
