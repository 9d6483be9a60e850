//! Weights of the six opportunity components.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of opportunity components.
pub const COMPONENT_COUNT: usize = 6;

/// Component names in weight-array order.
pub const COMPONENT_NAMES: [&str; COMPONENT_COUNT] = [
    "nutritional_gap",
    "brand_fragmentation",
    "category_size",
    "reformulation_feasibility",
    "pl_opportunity",
    "price_gap",
];

/// Weights for the composite opportunity score (sum to 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScoringWeights {
    /// Poor-grade share not served by healthy private label
    pub nutritional_gap: f64,
    /// 1 - concentration index
    pub brand_fragmentation: f64,
    /// ln(1 + product count)
    pub category_size: f64,
    /// Ease of reaching a healthy median grade
    pub reformulation_feasibility: f64,
    /// 1 - private-label penetration
    pub pl_opportunity: f64,
    /// Private-label discount against branded products
    pub price_gap: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            nutritional_gap: 0.25,
            brand_fragmentation: 0.15,
            category_size: 0.15,
            reformulation_feasibility: 0.15,
            pl_opportunity: 0.15,
            price_gap: 0.15,
        }
    }
}

impl ScoringWeights {
    /// Weights in component order
    #[must_use]
    pub const fn as_array(&self) -> [f64; COMPONENT_COUNT] {
        [
            self.nutritional_gap,
            self.brand_fragmentation,
            self.category_size,
            self.reformulation_feasibility,
            self.pl_opportunity,
            self.price_gap,
        ]
    }

    #[must_use]
    pub const fn from_array(w: [f64; COMPONENT_COUNT]) -> Self {
        Self {
            nutritional_gap: w[0],
            brand_fragmentation: w[1],
            category_size: w[2],
            reformulation_feasibility: w[3],
            pl_opportunity: w[4],
            price_gap: w[5],
        }
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Check if weights sum to ~1.0
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() < 0.001
    }

    /// Scale weights to sum to 1.0; all-zero weights are left alone.
    #[must_use]
    pub fn renormalize(&self) -> Self {
        let sum = self.sum();
        if sum <= 0.0 {
            return *self;
        }
        Self::from_array(self.as_array().map(|w| w / sum))
    }

    /// Weighted sum of normalized components.
    #[must_use]
    pub fn apply(&self, components: &[f64; COMPONENT_COUNT]) -> f64 {
        self.as_array()
            .iter()
            .zip(components)
            .map(|(w, c)| w * c)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!(ScoringWeights::default().is_normalized());
    }

    #[test]
    fn test_renormalize() {
        let w = ScoringWeights::from_array([2.0, 1.0, 1.0, 0.0, 0.0, 0.0]).renormalize();
        assert!(w.is_normalized());
        assert!((w.nutritional_gap - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_apply() {
        let w = ScoringWeights::default();
        assert!((w.apply(&[1.0; COMPONENT_COUNT]) - 1.0).abs() < 1e-12);
        assert!((w.apply(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]) - 0.25).abs() < 1e-12);
    }
}
