//! Benchmarks for grading, linking and ranking throughput.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pl_opportunity::linking::{LinkConfig, Linker};
use pl_opportunity::metrics::compute_category_metrics;
use pl_opportunity::model::{
    CategoryLevel, EnrichedProduct, MultiValue, Nutrients, ProductRecord, RecordSource,
};
use pl_opportunity::normalize::{CategoryMap, Normalizer, PrivateLabelRegistry};
use pl_opportunity::nutriscore::{fill_missing_grades, grade};
use pl_opportunity::scoring::{OpportunityScorer, SensitivityConfig};
use std::hint::black_box;

const NAMES: &[&str] = &[
    "yogur natural",
    "yogur griego",
    "galletas maria",
    "galletas digestive",
    "leche entera",
    "zumo de naranja",
    "pan de molde",
    "patatas fritas",
];
const BRANDS: &[&str] = &["hacendado", "danone", "cuetara", "pascual", "bimbo", "lays"];
const TAGS: &[&str] = &["en:yogurts", "en:biscuits", "en:milks", "en:fruit-juices", "en:breads", "en:crisps"];

fn synthetic_reference(n: usize) -> Vec<ProductRecord> {
    (0..n)
        .map(|i| {
            let mut r = ProductRecord::new(RecordSource::Reference, i as u64);
            r.code = Some(format!("84{i:011}"));
            r.name = Some(format!("{} {}", NAMES[i % NAMES.len()], i / NAMES.len()));
            r.brand = Some(BRANDS[i % BRANDS.len()].to_string());
            r.categories = MultiValue::new(vec![TAGS[i % TAGS.len()].to_string()]);
            r.countries = MultiValue::new(vec!["en:spain".to_string()]);
            r.nutrients = Nutrients {
                energy_kcal: Some((i % 500) as f64),
                sugars_g: Some((i % 40) as f64),
                saturated_fat_g: Some((i % 12) as f64),
                sodium_g: Some((i % 10) as f64 / 10.0),
                fiber_g: Some((i % 6) as f64),
                protein_g: Some((i % 15) as f64),
            };
            r
        })
        .collect()
}

fn synthetic_offers(reference: &[ProductRecord]) -> Vec<ProductRecord> {
    reference
        .iter()
        .step_by(3)
        .enumerate()
        .map(|(i, r)| {
            let mut offer = ProductRecord::new(RecordSource::retailer("mercadona", "es"), i as u64);
            // Every other offer has no code and must be linked by name.
            offer.code = (i % 2 == 0).then(|| r.code.clone()).flatten();
            offer.name = r.name.as_ref().map(|n| format!("{n} pack"));
            offer.brand = r.brand.clone();
            offer.price = Some(1.0 + (i % 7) as f64 / 2.0);
            offer
        })
        .collect()
}

fn benchmark_grading(c: &mut Criterion) {
    let records = synthetic_reference(10_000);
    c.bench_function("grade_10k_profiles", |b| {
        b.iter(|| {
            for r in &records {
                black_box(grade(&r.nutrients));
            }
        });
    });

    c.bench_function("fill_missing_grades_10k", |b| {
        b.iter_batched(
            || records.clone(),
            |mut batch| black_box(fill_missing_grades(&mut batch)),
            criterion::BatchSize::LargeInput,
        );
    });
}

fn benchmark_linking(c: &mut Criterion) {
    let mut group = c.benchmark_group("link");
    for size in [500usize, 2_000] {
        let reference = synthetic_reference(size);
        let offers = synthetic_offers(&reference);
        let linker = Linker::new(LinkConfig::default());
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(linker.link("mercadona", &offers, &reference, None)));
        });
    }
    group.finish();
}

fn benchmark_ranking(c: &mut Criterion) {
    let categories = CategoryMap::with_builtins();
    let private_labels = PrivateLabelRegistry::with_builtins();
    let normalizer = Normalizer::new(&categories, &private_labels);
    let mut table = normalizer.normalize_table("reference", synthetic_reference(5_000)).records;
    fill_missing_grades(&mut table);
    let rows: Vec<EnrichedProduct> = table.into_iter().map(EnrichedProduct::standalone).collect();
    let metrics = compute_category_metrics(&rows, CategoryLevel::Sub);

    let sensitivity = SensitivityConfig {
        draws: 1_000,
        ..SensitivityConfig::default()
    };
    let scorer = OpportunityScorer::default();
    c.bench_function("rank_with_1000_draws", |b| {
        b.iter(|| black_box(scorer.rank(metrics.clone(), Some(&sensitivity))));
    });
}

criterion_group!(benches, benchmark_grading, benchmark_linking, benchmark_ranking);
criterion_main!(benches);
