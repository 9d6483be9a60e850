//! Record linker scenarios.
//!
//! One-to-one assignment, exact-before-fuzzy precedence, country filtering
//! and pluggable matchers.

use pl_opportunity::linking::{CountryFilter, LinkConfig, Linker, RecordMatcher};
use pl_opportunity::model::{MatchMethod, MultiValue, ProductRecord, RecordSource};
use proptest::prelude::*;
use std::collections::HashSet;

fn reference(code: Option<&str>, name: &str, brand: &str, country: &str) -> ProductRecord {
    let mut r = ProductRecord::new(RecordSource::Reference, 0);
    r.code = code.map(str::to_string);
    r.name = Some(name.to_string());
    r.brand = Some(brand.to_string());
    r.countries = MultiValue::new(vec![country.to_string()]);
    r
}

fn offer(code: Option<&str>, name: &str, brand: &str) -> ProductRecord {
    let mut r = ProductRecord::new(RecordSource::retailer("ah", "nl"), 0);
    r.code = code.map(str::to_string);
    r.name = Some(name.to_string());
    r.brand = Some(brand.to_string());
    r
}

#[test]
fn exact_codes_take_precedence_over_fuzzy_names() {
    let refs = vec![
        reference(Some("111"), "Halfvolle melk", "Campina", "en:netherlands"),
        reference(Some("222"), "Volle melk", "Campina", "en:netherlands"),
    ];
    // Code points at the second record even though the name matches the first.
    let source = vec![offer(Some("222"), "Halfvolle melk", "Campina")];

    let result = Linker::new(LinkConfig::default()).link("ah", &source, &refs, None);
    assert_eq!(result.pairs.len(), 1);
    assert_eq!(result.pairs[0].reference, 1);
    assert_eq!(result.pairs[0].method, MatchMethod::Exact);
    assert_eq!(result.report.exact, 1);
    assert_eq!(result.unmatched_reference, vec![0]);
}

#[test]
fn competing_sources_never_share_a_reference() {
    let refs = vec![reference(None, "Griekse yoghurt", "Zuivelhoeve", "en:netherlands")];
    let source = vec![
        offer(None, "Griekse yoghurt", "Zuivelhoeve"),
        offer(None, "Griekse yoghurt naturel", "Zuivelhoeve"),
    ];

    let result = Linker::new(LinkConfig::default()).link("ah", &source, &refs, None);
    assert_eq!(result.pairs.len(), 1);
    assert_eq!(result.pairs[0].source, 0);
    assert_eq!(result.pairs[0].method, MatchMethod::Fuzzy);
    assert_eq!(result.unmatched_source, vec![1]);
}

#[test]
fn country_filter_leaves_foreign_only_subsets_unmatched() {
    let refs = vec![reference(None, "Pindakaas", "Calvé", "en:spain")];
    let source = vec![offer(None, "Pindakaas", "Calvé")];

    let filter = CountryFilter::new("nl");
    let result = Linker::new(LinkConfig::default()).link("ah", &source, &refs, Some(&filter));
    assert!(result.pairs.is_empty());
    assert_eq!(result.report.unmatched, 1);
    assert_eq!(result.report.match_rate, 0.0);
}

#[test]
fn untagged_references_are_fuzzy_candidates_under_a_country_filter() {
    let mut untagged = reference(None, "Pindakaas", "Calvé", "en:netherlands");
    untagged.countries = MultiValue::default();
    let refs = vec![reference(None, "Pindakaas", "Calvé", "en:spain"), untagged];
    let source = vec![offer(None, "Pindakaas", "Calvé")];

    let filter = CountryFilter::new("nl");
    let result = Linker::new(LinkConfig::default()).link("ah", &source, &refs, Some(&filter));
    assert_eq!(result.pairs.len(), 1);
    assert_eq!(result.pairs[0].reference, 1);
    assert_eq!(result.pairs[0].method, MatchMethod::Fuzzy);
}

#[test]
fn exact_only_skips_the_fuzzy_stage() {
    let refs = vec![reference(None, "Pindakaas", "Calvé", "en:netherlands")];
    let source = vec![offer(None, "Pindakaas", "Calvé")];
    let config = LinkConfig {
        exact_only: true,
        ..LinkConfig::default()
    };

    let result = Linker::new(config).link("ah", &source, &refs, None);
    assert!(result.pairs.is_empty());
    assert_eq!(result.report.fuzzy, 0);
}

#[test]
fn below_threshold_pairs_are_rejected() {
    let refs = vec![reference(None, "Chocoladepasta", "Nutella", "en:netherlands")];
    let source = vec![offer(None, "Appelsap troebel", "Appelaere")];

    let result = Linker::new(LinkConfig::default()).link("ah", &source, &refs, None);
    assert!(result.pairs.is_empty());
    assert_eq!(result.unmatched_source, vec![0]);
}

struct CodeSuffixMatcher;

impl RecordMatcher for CodeSuffixMatcher {
    fn key(&self, record: &ProductRecord) -> String {
        record.name.clone().unwrap_or_default()
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a.ends_with(b) || b.ends_with(a) { 100.0 } else { 0.0 }
    }

    fn name(&self) -> &'static str {
        "suffix"
    }
}

#[test]
fn custom_matcher_drives_the_fuzzy_stage() {
    let refs = vec![reference(None, "melk", "Campina", "en:netherlands")];
    let source = vec![offer(None, "halfvolle melk", "Other")];

    let linker = Linker::with_matcher(LinkConfig::default(), Box::new(CodeSuffixMatcher));
    let result = linker.link("ah", &source, &refs, None);
    assert_eq!(result.pairs.len(), 1);
    assert!((result.pairs[0].similarity - 100.0).abs() < 1e-9);
}

fn name_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "yogur natural",
        "yogur griego",
        "galletas maria",
        "galletas digestive",
        "leche entera",
        "leche semidesnatada",
        "zumo naranja",
    ])
    .prop_map(str::to_string)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn every_reference_is_assigned_at_most_once(
        ref_names in prop::collection::vec(name_strategy(), 1..12),
        src_names in prop::collection::vec(name_strategy(), 1..12),
        threshold in 50.0f64..100.0,
    ) {
        let refs: Vec<ProductRecord> = ref_names
            .iter()
            .map(|n| reference(None, n, "marca", "en:spain"))
            .collect();
        let source: Vec<ProductRecord> = src_names
            .iter()
            .map(|n| offer(None, n, "marca"))
            .collect();
        let config = LinkConfig { threshold, ..LinkConfig::default() };

        let result = Linker::new(config).link("ah", &source, &refs, None);

        let mut seen_refs = HashSet::new();
        let mut seen_src = HashSet::new();
        for pair in &result.pairs {
            prop_assert!(seen_refs.insert(pair.reference));
            prop_assert!(seen_src.insert(pair.source));
            prop_assert!(pair.similarity >= threshold);
        }
        prop_assert_eq!(result.pairs.len() + result.unmatched_source.len(), source.len());
        prop_assert_eq!(result.pairs.len() + result.unmatched_reference.len(), refs.len());
    }
}
