//! Small statistics helpers with explicit empty-input behavior.

use std::collections::HashMap;

/// Median of the finite values, or `None` when there are none.
#[must_use]
pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Mean of the finite values, or `None` when there are none.
#[must_use]
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Sample standard deviation (n - 1) of the finite values; `None` with
/// fewer than two.
#[must_use]
pub fn sample_std(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let finite: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return None;
    }
    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    let var = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}

/// `num / den`, with 0/0 defined as 0.
#[must_use]
pub fn safe_ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Herfindahl index over brand counts: sum of squared shares.
///
/// Lies in [1/n, 1] for n brands, equals 1 only for a single brand and is 0
/// when there are no branded products. Shares are summed in ascending count
/// order, so the result does not depend on map iteration order.
#[must_use]
pub fn concentration_index<S: std::hash::BuildHasher>(brand_counts: &HashMap<&str, usize, S>) -> f64 {
    let mut counts: Vec<usize> = brand_counts.values().copied().collect();
    counts.sort_unstable();
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    counts
        .iter()
        .map(|count| {
            let share = *count as f64 / total as f64;
            share * share
        })
        .sum()
}
