//! Raw and min-max normalized opportunity components.

use super::weights::COMPONENT_COUNT;
use crate::metrics::CategoryMetrics;
use serde::{Deserialize, Serialize};

/// Value given to a constant column and to missing price terms.
pub const NEUTRAL: f64 = 0.5;

/// The six opportunity components of one category, before or after
/// normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub nutritional_gap: f64,
    pub brand_fragmentation: f64,
    pub category_size: f64,
    pub reformulation_feasibility: f64,
    pub pl_opportunity: f64,
    /// PL discount; `None` when the category has no two-sided price data
    pub price_gap: Option<f64>,
}

impl Components {
    /// Raw component values derived from category metrics.
    #[must_use]
    pub fn from_metrics(m: &CategoryMetrics) -> Self {
        Self {
            nutritional_gap: m.nutritional_gap,
            brand_fragmentation: 1.0 - m.concentration_index,
            category_size: (m.product_count as f64).ln_1p(),
            reformulation_feasibility: m.reformulation.feasibility(),
            pl_opportunity: 1.0 - m.pl_penetration,
            price_gap: m.price_gap.map(|p| p.pl_discount),
        }
    }

    fn column(&self, index: usize) -> Option<f64> {
        match index {
            0 => Some(self.nutritional_gap),
            1 => Some(self.brand_fragmentation),
            2 => Some(self.category_size),
            3 => Some(self.reformulation_feasibility),
            4 => Some(self.pl_opportunity),
            _ => self.price_gap,
        }
    }

    /// Components as an array; a missing price term is neutral.
    #[must_use]
    pub fn as_array(&self) -> [f64; COMPONENT_COUNT] {
        [
            self.nutritional_gap,
            self.brand_fragmentation,
            self.category_size,
            self.reformulation_feasibility,
            self.pl_opportunity,
            self.price_gap.unwrap_or(NEUTRAL),
        ]
    }

    /// Wrap an already-normalized row.
    #[must_use]
    pub const fn from_normalized(row: [f64; COMPONENT_COUNT]) -> Self {
        Self {
            nutritional_gap: row[0],
            brand_fragmentation: row[1],
            category_size: row[2],
            reformulation_feasibility: row[3],
            pl_opportunity: row[4],
            price_gap: Some(row[5]),
        }
    }
}

/// Min-max scale present values to [0, 1]. A constant column and missing
/// values map to [`NEUTRAL`].
#[must_use]
pub fn min_max(values: &[Option<f64>]) -> Vec<f64> {
    let present = values.iter().flatten().filter(|v| v.is_finite());
    let (min, max) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(*v), hi.max(*v))
    });
    let span = max - min;
    values
        .iter()
        .map(|v| match v {
            Some(v) if v.is_finite() && span.is_finite() && span > 1e-12 => (v - min) / span,
            _ => NEUTRAL,
        })
        .collect()
}

/// Normalize each component column across the categories ranked together.
///
/// Normalized values depend on which categories are in the set, so scores
/// from different sets are not comparable.
#[must_use]
pub fn normalize_columns(raw: &[Components]) -> Vec<[f64; COMPONENT_COUNT]> {
    let mut out = vec![[NEUTRAL; COMPONENT_COUNT]; raw.len()];
    for col in 0..COMPONENT_COUNT {
        let column: Vec<Option<f64>> = raw.iter().map(|c| c.column(col)).collect();
        for (row, value) in min_max(&column).into_iter().enumerate() {
            out[row][col] = value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max_basic() {
        let out = min_max(&[Some(1.0), Some(3.0), Some(2.0)]);
        assert_eq!(out, vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_min_max_constant_and_missing() {
        assert_eq!(min_max(&[Some(4.0), Some(4.0)]), vec![NEUTRAL, NEUTRAL]);
        assert_eq!(min_max(&[Some(0.0), None, Some(1.0)]), vec![0.0, NEUTRAL, 1.0]);
        assert_eq!(min_max(&[None, None]), vec![NEUTRAL, NEUTRAL]);
        assert!(min_max(&[]).is_empty());
    }

    #[test]
    fn test_min_max_affine_invariant() {
        let base = min_max(&[Some(0.1), Some(0.7), Some(0.4)]);
        let scaled = min_max(&[Some(3.0 * 0.1 + 5.0), Some(3.0 * 0.7 + 5.0), Some(3.0 * 0.4 + 5.0)]);
        for (a, b) in base.iter().zip(&scaled) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}
