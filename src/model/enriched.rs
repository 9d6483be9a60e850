//! Joined product rows handed to the category metrics stage.

use super::{NutriGrade, ProductRecord};
use serde::{Deserialize, Serialize};

/// How a retailer record was linked to its reference record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Identical external code
    Exact,
    /// Name + brand similarity above threshold
    Fuzzy,
}

/// The retailer side of an accepted link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetailerMatch {
    pub retailer: String,
    pub country: String,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub is_private_label: bool,
    pub method: MatchMethod,
    /// 0.0 - 1.0; exact matches are 1.0
    pub confidence: f64,
}

/// A product row of the enriched joined table.
///
/// Reference rows carry at most one match per retailer feed. Retailer
/// records that found no reference partner appear as standalone rows with
/// no matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedProduct {
    pub product: ProductRecord,
    pub matches: Vec<RetailerMatch>,
}

impl EnrichedProduct {
    #[must_use]
    pub const fn standalone(product: ProductRecord) -> Self {
        Self {
            product,
            matches: Vec::new(),
        }
    }

    #[must_use]
    pub fn grade(&self) -> Option<NutriGrade> {
        self.product.grade
    }

    /// Private label on either side of the join.
    #[must_use]
    pub fn is_private_label(&self) -> bool {
        self.product.is_private_label || self.matches.iter().any(|m| m.is_private_label)
    }

    /// Price observations as `(price, is_private_label)` pairs.
    pub fn price_observations(&self) -> impl Iterator<Item = (f64, bool)> + '_ {
        let own = self
            .product
            .price
            .map(|p| (p, self.product.is_private_label));
        own.into_iter().chain(
            self.matches
                .iter()
                .filter_map(|m| m.price.map(|p| (p, m.is_private_label))),
        )
    }

    /// Price observations attributed to the retailer that listed them, as
    /// `(retailer, price, is_private_label)`. Reference-side prices have no
    /// retailer and are skipped.
    pub fn retailer_price_observations(&self) -> impl Iterator<Item = (&str, f64, bool)> + '_ {
        let own = self
            .product
            .source
            .retailer_id()
            .zip(self.product.price)
            .map(|(retailer, p)| (retailer, p, self.product.is_private_label));
        own.into_iter().chain(self.matches.iter().filter_map(|m| {
            m.price.map(|p| (m.retailer.as_str(), p, m.is_private_label))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordSource;

    fn retailer_match(pl: bool, price: Option<f64>) -> RetailerMatch {
        RetailerMatch {
            retailer: "mercadona".into(),
            country: "es".into(),
            name: None,
            brand: None,
            price,
            is_private_label: pl,
            method: MatchMethod::Fuzzy,
            confidence: 0.8,
        }
    }

    #[test]
    fn test_private_label_from_either_side() {
        let product = ProductRecord::new(RecordSource::Reference, 0);
        let mut row = EnrichedProduct::standalone(product);
        assert!(!row.is_private_label());
        row.matches.push(retailer_match(true, Some(1.2)));
        assert!(row.is_private_label());
    }

    #[test]
    fn test_price_observations_include_matches() {
        let mut product = ProductRecord::new(RecordSource::retailer("ah", "nl"), 0);
        product.price = Some(2.0);
        let mut row = EnrichedProduct::standalone(product);
        row.matches.push(retailer_match(true, Some(1.0)));
        row.matches.push(retailer_match(false, None));
        let prices: Vec<_> = row.price_observations().collect();
        assert_eq!(prices, vec![(2.0, false), (1.0, true)]);

        let by_retailer: Vec<_> = row.retailer_price_observations().collect();
        assert_eq!(by_retailer, vec![("ah", 2.0, false), ("mercadona", 1.0, true)]);
    }

    #[test]
    fn test_reference_prices_have_no_retailer() {
        let mut product = ProductRecord::new(RecordSource::Reference, 0);
        product.price = Some(3.0);
        let row = EnrichedProduct::standalone(product);
        assert_eq!(row.price_observations().count(), 1);
        assert_eq!(row.retailer_price_observations().count(), 0);
    }
}
