//! Branded vs private-label price comparison.

use super::stats::median;
use serde::{Deserialize, Serialize};

/// Median shelf prices of branded and private-label products in a category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceGap {
    pub branded_median: f64,
    pub pl_median: f64,
    /// `branded_median - pl_median`
    pub gap_abs: f64,
    /// PL discount as a fraction of the branded median
    pub pl_discount: f64,
    pub branded_observations: usize,
    pub pl_observations: usize,
}

/// Price gap from `(price, is_private_label)` observations.
///
/// `None` unless both sides carry at least one price and the branded
/// median is positive.
#[must_use]
pub fn price_gap(observations: impl IntoIterator<Item = (f64, bool)>) -> Option<PriceGap> {
    let (pl, branded): (Vec<(f64, bool)>, Vec<(f64, bool)>) = observations
        .into_iter()
        .filter(|(price, _)| price.is_finite() && *price >= 0.0)
        .partition(|(_, is_pl)| *is_pl);

    let branded_median = median(branded.iter().map(|(p, _)| *p))?;
    let pl_median = median(pl.iter().map(|(p, _)| *p))?;
    if branded_median <= 0.0 {
        return None;
    }

    Some(PriceGap {
        branded_median,
        pl_median,
        gap_abs: branded_median - pl_median,
        pl_discount: (branded_median - pl_median) / branded_median,
        branded_observations: branded.len(),
        pl_observations: pl.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_from_medians() {
        let gap = price_gap([(2.0, false), (4.0, false), (1.5, true)]).expect("both sides priced");
        assert_eq!(gap.branded_median, 3.0);
        assert_eq!(gap.pl_median, 1.5);
        assert!((gap.pl_discount - 0.5).abs() < 1e-12);
        assert_eq!(gap.branded_observations, 2);
    }

    #[test]
    fn test_one_sided_prices_give_none() {
        assert!(price_gap([(2.0, false)]).is_none());
        assert!(price_gap([(2.0, true)]).is_none());
        assert!(price_gap(std::iter::empty()).is_none());
    }
}
