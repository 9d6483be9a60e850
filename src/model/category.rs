//! Two-level product category.

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Name used for both levels when no source tag maps to a category.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Harmonized category: a broad group and a more specific subgroup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Category {
    pub broad: String,
    pub sub: String,
}

impl Category {
    pub fn new(broad: impl Into<String>, sub: impl Into<String>) -> Self {
        Self {
            broad: broad.into(),
            sub: sub.into(),
        }
    }

    #[must_use]
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_CATEGORY, UNKNOWN_CATEGORY)
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.broad == UNKNOWN_CATEGORY
    }

    /// Grouping key at the requested level.
    #[must_use]
    pub fn key(&self, level: CategoryLevel) -> String {
        match level {
            CategoryLevel::Broad => self.broad.clone(),
            CategoryLevel::Sub => format!("{} / {}", self.broad, self.sub),
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::unknown()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.broad, self.sub)
    }
}

/// Level of the category hierarchy that metrics are grouped by.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum CategoryLevel {
    /// Broad group (e.g. "Dairy")
    #[default]
    Broad,
    /// Broad group and subgroup (e.g. "Dairy / Yogurts")
    Sub,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_keys() {
        let cat = Category::new("Dairy", "Yogurts");
        assert_eq!(cat.key(CategoryLevel::Broad), "Dairy");
        assert_eq!(cat.key(CategoryLevel::Sub), "Dairy / Yogurts");
        assert!(!cat.is_unknown());
        assert!(Category::default().is_unknown());
    }
}
