//! Per-category aggregate metrics over the enriched product table.
//!
//! Every ratio with an empty denominator is defined as 0. Categories are
//! computed in parallel and returned sorted by key.

mod price;
mod reformulation;
pub mod stats;

pub use price::{PriceGap, price_gap};
pub use reformulation::{Reformulation, reformulate};

use crate::model::{CategoryLevel, EnrichedProduct, NutriGrade, Nutrients};
use crate::nutriscore::grade;
use indexmap::IndexMap;
use rayon::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use stats::{concentration_index, mean, median, safe_ratio, sample_std};
use std::collections::{BTreeMap, HashMap};

/// Category metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MetricsConfig {
    /// Hierarchy level categories are grouped by
    pub level: CategoryLevel,
    /// Carry unmatched retailer records as standalone rows
    pub include_unmatched_retailer: bool,
    /// Rank the Unknown category alongside mapped categories
    pub retain_unknown: bool,
    /// Categories with fewer products are reported but not ranked
    pub min_products: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            level: CategoryLevel::Broad,
            include_unmatched_retailer: true,
            retain_unknown: false,
            min_products: 1,
        }
    }
}

/// Aggregate statistics of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMetrics {
    pub key: String,
    pub is_unknown: bool,
    pub product_count: usize,
    pub graded_count: usize,
    pub healthy_count: usize,
    pub private_label_count: usize,
    pub healthy_private_label_count: usize,
    pub branded_count: usize,
    pub distinct_brands: usize,
    /// Share of graded products per grade, A to E; all 0 when nothing is
    /// graded
    pub grade_distribution: [f64; 5],
    /// Share of graded products in C, D or E
    pub poor_grade_fraction: f64,
    /// Sum of squared brand shares over branded products
    pub concentration_index: f64,
    pub pl_penetration: f64,
    /// Share of A/B products that are private label
    pub pl_penetration_healthy: f64,
    /// `poor_grade_fraction * (1 - pl_penetration_healthy)`
    pub nutritional_gap: f64,
    pub median_profile: Nutrients,
    pub nutrient_mean: Nutrients,
    /// Sample standard deviation; missing below two observations
    pub nutrient_std: Nutrients,
    pub median_grade: Option<NutriGrade>,
    pub median_score: Option<i32>,
    pub reformulation: Reformulation,
    /// Pooled over every retailer's prices
    pub price_gap: Option<PriceGap>,
    /// Branded vs PL prices within each retailer, by retailer id
    pub price_gaps: IndexMap<String, PriceGap>,
    /// Retailer-side product observations per retailer
    pub retailer_skus: BTreeMap<String, usize>,
}

impl CategoryMetrics {
    /// Whether this category takes part in ranking.
    #[must_use]
    pub fn is_rankable(&self, config: &MetricsConfig) -> bool {
        (config.retain_unknown || !self.is_unknown) && self.product_count >= config.min_products
    }
}

/// Compute metrics for every category present in `rows`.
#[must_use]
pub fn compute_category_metrics(rows: &[EnrichedProduct], level: CategoryLevel) -> Vec<CategoryMetrics> {
    let mut groups: HashMap<String, Vec<&EnrichedProduct>> = HashMap::new();
    for row in rows {
        groups
            .entry(row.product.category.key(level))
            .or_default()
            .push(row);
    }

    let mut metrics: Vec<CategoryMetrics> = groups
        .into_par_iter()
        .map(|(key, members)| category_metrics(key, &members))
        .collect();
    metrics.sort_by(|a, b| a.key.cmp(&b.key));

    tracing::info!(
        categories = metrics.len(),
        products = rows.len(),
        ?level,
        "computed category metrics"
    );
    metrics
}

/// Metrics of a single category from its member rows.
#[must_use]
pub fn category_metrics(key: String, members: &[&EnrichedProduct]) -> CategoryMetrics {
    let product_count = members.len();
    let is_unknown = members.first().is_some_and(|r| r.product.category.is_unknown());

    let mut graded_count = 0;
    let mut grade_counts = [0usize; 5];
    let mut healthy_count = 0;
    let mut private_label_count = 0;
    let mut healthy_private_label_count = 0;
    let mut brand_counts: HashMap<&str, usize> = HashMap::new();
    let mut retailer_skus: BTreeMap<String, usize> = BTreeMap::new();

    for row in members {
        let is_pl = row.is_private_label();
        if is_pl {
            private_label_count += 1;
        }
        if let Some(g) = row.grade() {
            graded_count += 1;
            grade_counts[g.index()] += 1;
            if g.is_healthy() {
                healthy_count += 1;
                if is_pl {
                    healthy_private_label_count += 1;
                }
            }
        }
        if let Some(brand) = row.product.brand.as_deref() {
            *brand_counts.entry(brand).or_default() += 1;
        }
        if let Some(retailer) = row.product.source.retailer_id() {
            *retailer_skus.entry(retailer.to_string()).or_default() += 1;
        }
        for m in &row.matches {
            *retailer_skus.entry(m.retailer.clone()).or_default() += 1;
        }
    }

    let poor_grade_fraction = safe_ratio(graded_count - healthy_count, graded_count);
    let pl_penetration_healthy = safe_ratio(healthy_private_label_count, healthy_count);

    let median_profile = nutrient_profile(members, median);
    let median_result = grade(&median_profile);

    CategoryMetrics {
        key,
        is_unknown,
        product_count,
        graded_count,
        healthy_count,
        private_label_count,
        healthy_private_label_count,
        branded_count: brand_counts.values().sum(),
        distinct_brands: brand_counts.len(),
        grade_distribution: grade_counts.map(|count| safe_ratio(count, graded_count)),
        poor_grade_fraction,
        concentration_index: concentration_index(&brand_counts),
        pl_penetration: safe_ratio(private_label_count, product_count),
        pl_penetration_healthy,
        nutritional_gap: poor_grade_fraction * (1.0 - pl_penetration_healthy),
        median_profile,
        nutrient_mean: nutrient_profile(members, mean),
        nutrient_std: nutrient_profile(members, sample_std),
        median_grade: median_result.map(|r| r.grade),
        median_score: median_result.map(|r| r.score),
        reformulation: reformulate(&median_profile),
        price_gap: price_gap(members.iter().flat_map(|r| r.price_observations())),
        price_gaps: retailer_price_gaps(members),
        retailer_skus,
    }
}

/// One statistic per nutrient, each ignoring products where it is missing.
fn nutrient_profile(
    members: &[&EnrichedProduct],
    stat: impl Fn(Vec<f64>) -> Option<f64>,
) -> Nutrients {
    let of = |field: fn(&Nutrients) -> Option<f64>| {
        stat(members.iter().filter_map(|r| field(&r.product.nutrients)).collect())
    };
    Nutrients {
        energy_kcal: of(|n: &Nutrients| n.energy_kcal),
        sugars_g: of(|n: &Nutrients| n.sugars_g),
        saturated_fat_g: of(|n: &Nutrients| n.saturated_fat_g),
        sodium_g: of(|n: &Nutrients| n.sodium_g),
        fiber_g: of(|n: &Nutrients| n.fiber_g),
        protein_g: of(|n: &Nutrients| n.protein_g),
    }
}

/// Price gap per retailer, so each retailer's private label is compared
/// with the branded products on its own shelf.
fn retailer_price_gaps(members: &[&EnrichedProduct]) -> IndexMap<String, PriceGap> {
    let mut observations: BTreeMap<&str, Vec<(f64, bool)>> = BTreeMap::new();
    for row in members {
        for (retailer, price, is_pl) in row.retailer_price_observations() {
            observations.entry(retailer).or_default().push((price, is_pl));
        }
    }
    observations
        .into_iter()
        .filter_map(|(retailer, obs)| price_gap(obs).map(|gap| (retailer.to_string(), gap)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, MatchMethod, ProductRecord, RecordSource, RetailerMatch};

    fn row(brand: Option<&str>, grade: Option<NutriGrade>, pl: bool) -> EnrichedProduct {
        let mut p = ProductRecord::new(RecordSource::Reference, 0);
        p.name = Some("x".into());
        p.brand = brand.map(str::to_string);
        p.grade = grade;
        p.is_private_label = pl;
        p.category = Category::new("Dairy", "Yogurts");
        EnrichedProduct::standalone(p)
    }

    #[test]
    fn test_core_ratios() {
        let rows = vec![
            row(Some("danone"), Some(NutriGrade::D), false),
            row(Some("danone"), Some(NutriGrade::A), false),
            row(Some("hacendado"), Some(NutriGrade::B), true),
            row(None, None, false),
        ];
        let refs: Vec<&EnrichedProduct> = rows.iter().collect();
        let m = category_metrics("Dairy".into(), &refs);
        assert_eq!(m.product_count, 4);
        assert_eq!(m.graded_count, 3);
        assert!((m.poor_grade_fraction - 1.0 / 3.0).abs() < 1e-12);
        let third = 1.0 / 3.0;
        for (share, expected) in m.grade_distribution.iter().zip([third, third, 0.0, third, 0.0]) {
            assert!((share - expected).abs() < 1e-12);
        }
        assert!((m.pl_penetration - 0.25).abs() < 1e-12);
        assert!((m.pl_penetration_healthy - 0.5).abs() < 1e-12);
        assert!((m.nutritional_gap - 1.0 / 6.0).abs() < 1e-12);
        // shares 2/3 and 1/3 over branded products only
        assert!((m.concentration_index - 5.0 / 9.0).abs() < 1e-12);
        assert_eq!(m.distinct_brands, 2);
        assert_eq!(m.reformulation, Reformulation::InsufficientData);
    }

    #[test]
    fn test_grade_distribution_empty_when_ungraded() {
        let rows = vec![row(Some("a"), None, false)];
        let refs: Vec<&EnrichedProduct> = rows.iter().collect();
        assert_eq!(category_metrics("k".into(), &refs).grade_distribution, [0.0; 5]);
    }

    #[test]
    fn test_nutrient_mean_and_std_ignore_missing_values() {
        let mut rows = vec![
            row(None, None, false),
            row(None, None, false),
            row(None, None, false),
        ];
        rows[0].product.nutrients.sugars_g = Some(2.0);
        rows[1].product.nutrients.sugars_g = Some(4.0);
        rows[2].product.nutrients.sugars_g = Some(12.0);
        rows[0].product.nutrients.fiber_g = Some(3.0);
        let refs: Vec<&EnrichedProduct> = rows.iter().collect();
        let m = category_metrics("k".into(), &refs);

        assert_eq!(m.median_profile.sugars_g, Some(4.0));
        assert_eq!(m.nutrient_mean.sugars_g, Some(6.0));
        // deviations -4, -2, 6 over n - 1 = 2
        let std = m.nutrient_std.sugars_g.expect("three sugar values");
        assert!((std - 28.0f64.sqrt()).abs() < 1e-12);

        assert_eq!(m.nutrient_mean.fiber_g, Some(3.0));
        assert_eq!(m.nutrient_std.fiber_g, None);
        assert_eq!(m.nutrient_mean.protein_g, None);
    }

    #[test]
    fn test_price_gaps_stay_within_each_retailer() {
        let offer = |retailer: &str, price: f64, pl: bool| {
            let mut p = ProductRecord::new(RecordSource::retailer(retailer, "es"), 0);
            p.name = Some("x".into());
            p.price = Some(price);
            p.is_private_label = pl;
            EnrichedProduct::standalone(p)
        };
        let rows = vec![
            offer("premium", 4.0, false),
            offer("premium", 3.0, true),
            offer("discount", 1.5, false),
            offer("discount", 1.0, true),
            // branded only: no gap for this retailer
            offer("corner", 2.0, false),
        ];
        let refs: Vec<&EnrichedProduct> = rows.iter().collect();
        let m = category_metrics("k".into(), &refs);

        let retailers: Vec<&str> = m.price_gaps.keys().map(String::as_str).collect();
        assert_eq!(retailers, vec!["discount", "premium"]);
        assert!((m.price_gaps["discount"].pl_discount - 1.0 / 3.0).abs() < 1e-12);
        assert!((m.price_gaps["premium"].pl_discount - 0.25).abs() < 1e-12);

        // The pooled gap compares across shelves.
        let pooled = m.price_gap.expect("both sides priced");
        assert_eq!(pooled.branded_median, 2.0);
        assert_eq!(pooled.pl_median, 2.0);
    }

    #[test]
    fn test_healthy_pl_penetration_zero_cases() {
        let no_pl = vec![row(Some("a"), Some(NutriGrade::A), false)];
        let refs: Vec<&EnrichedProduct> = no_pl.iter().collect();
        assert_eq!(category_metrics("k".into(), &refs).pl_penetration_healthy, 0.0);

        let no_healthy = vec![row(Some("a"), Some(NutriGrade::E), true)];
        let refs: Vec<&EnrichedProduct> = no_healthy.iter().collect();
        let m = category_metrics("k".into(), &refs);
        assert_eq!(m.pl_penetration_healthy, 0.0);
        assert_eq!(m.nutritional_gap, 1.0);
    }

    #[test]
    fn test_pl_flag_from_retailer_match() {
        let mut r = row(Some("brandx"), Some(NutriGrade::A), false);
        r.matches.push(RetailerMatch {
            retailer: "mercadona".into(),
            country: "es".into(),
            name: None,
            brand: Some("hacendado".into()),
            price: Some(1.0),
            is_private_label: true,
            method: MatchMethod::Exact,
            confidence: 1.0,
        });
        let refs = vec![&r];
        let m = category_metrics("k".into(), &refs);
        assert_eq!(m.private_label_count, 1);
        assert_eq!(m.retailer_skus.get("mercadona"), Some(&1));
    }

    #[test]
    fn test_grouping_sorted_and_unknown_flagged() {
        let mut unknown = row(None, None, false);
        unknown.product.category = Category::unknown();
        let mut snacks = row(None, None, false);
        snacks.product.category = Category::new("Snacks", "Crisps");
        let rows = vec![snacks, row(None, None, false), unknown];
        let metrics = compute_category_metrics(&rows, CategoryLevel::Broad);
        let keys: Vec<&str> = metrics.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["Dairy", "Snacks", "Unknown"]);
        let config = MetricsConfig::default();
        assert!(!metrics[2].is_rankable(&config));
        assert!(metrics[0].is_rankable(&config));
    }
}
