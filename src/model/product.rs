//! Canonical product record and the raw rows it is built from.

use super::{Category, GradeOrigin, MultiValue, NutriGrade, Nutrients};
use serde::{Deserialize, Deserializer, Serialize};
use xxhash_rust::xxh3::xxh3_64;

/// Which collaborator produced a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordSource {
    /// The bulk nutrition reference dataset
    Reference,
    /// A retailer catalogue feed
    Retailer { retailer: String, country: String },
}

impl RecordSource {
    pub fn retailer(retailer: impl Into<String>, country: impl Into<String>) -> Self {
        Self::Retailer {
            retailer: retailer.into(),
            country: country.into(),
        }
    }

    #[must_use]
    pub fn retailer_id(&self) -> Option<&str> {
        match self {
            Self::Reference => None,
            Self::Retailer { retailer, .. } => Some(retailer),
        }
    }
}

/// Canonical product record shared by every pipeline stage.
///
/// Records are mutated only by the normalizer (cleaning) and by the
/// Nutri-Score fill (missing grades). Later stages read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Exact external code (barcode) when known
    pub code: Option<String>,
    pub name: Option<String>,
    /// Normalized brand
    pub brand: Option<String>,
    /// Source category path, most generic tag first
    pub categories: MultiValue,
    pub labels: MultiValue,
    pub countries: MultiValue,
    pub nutrients: Nutrients,
    pub grade: Option<NutriGrade>,
    /// Numeric Nutri-Score, when reported or computed
    pub nutriscore: Option<i32>,
    pub grade_origin: GradeOrigin,
    /// Shelf price from a retailer feed
    pub price: Option<f64>,
    pub source: RecordSource,
    pub category: Category,
    pub is_private_label: bool,
    /// Position in ingestion order; later wins on duplicate codes
    pub ingest_seq: u64,
}

impl ProductRecord {
    /// Empty record from `source`, placed at `ingest_seq` in ingestion order.
    #[must_use]
    pub fn new(source: RecordSource, ingest_seq: u64) -> Self {
        Self {
            code: None,
            name: None,
            brand: None,
            categories: MultiValue::default(),
            labels: MultiValue::default(),
            countries: MultiValue::default(),
            nutrients: Nutrients::default(),
            grade: None,
            nutriscore: None,
            grade_origin: GradeOrigin::Missing,
            price: None,
            source,
            category: Category::unknown(),
            is_private_label: false,
            ingest_seq,
        }
    }

    /// Text compared by the fuzzy linker: name followed by brand.
    #[must_use]
    pub fn match_text(&self) -> String {
        [self.name.as_deref(), self.brand.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Count of populated data fields, used to rank candidates by data quality.
    #[must_use]
    pub fn completeness(&self) -> usize {
        usize::from(self.code.is_some())
            + usize::from(self.name.is_some())
            + usize::from(self.brand.is_some())
            + usize::from(!self.categories.is_empty())
            + usize::from(self.grade.is_some())
            + self.nutrients.present_count()
    }

    /// Hash of the record's attributes, ignoring its ingestion position.
    ///
    /// Two records with equal fingerprints carry the same data.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut view = self.clone();
        view.ingest_seq = 0;
        serde_json::to_vec(&view).map_or(0, |bytes| xxh3_64(&bytes))
    }
}

/// One row of the reference (bulk nutrition) table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceRow {
    #[serde(default, deserialize_with = "deserialize_code")]
    pub code: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub brands: Option<String>,
    #[serde(default)]
    pub categories_tags: Option<MultiValue>,
    #[serde(default)]
    pub countries_tags: Option<MultiValue>,
    #[serde(default)]
    pub labels_tags: Option<MultiValue>,
    #[serde(default)]
    pub energy_kcal_100g: Option<f64>,
    #[serde(default)]
    pub sugars_100g: Option<f64>,
    #[serde(default)]
    pub saturated_fat_100g: Option<f64>,
    #[serde(default)]
    pub sodium_100g: Option<f64>,
    #[serde(default)]
    pub fiber_100g: Option<f64>,
    #[serde(default)]
    pub proteins_100g: Option<f64>,
    #[serde(default)]
    pub nutriscore_grade: Option<String>,
    #[serde(default)]
    pub nutriscore_score: Option<i32>,
}

impl ReferenceRow {
    /// Lift the row into an uncleaned [`ProductRecord`].
    #[must_use]
    pub fn into_record(self, ingest_seq: u64) -> ProductRecord {
        let mut record = ProductRecord::new(RecordSource::Reference, ingest_seq);
        record.code = self.code;
        record.name = self.product_name;
        record.brand = self.brands;
        record.categories = self.categories_tags.unwrap_or_default();
        record.countries = self.countries_tags.unwrap_or_default();
        record.labels = self.labels_tags.unwrap_or_default();
        record.nutrients = Nutrients {
            energy_kcal: self.energy_kcal_100g,
            sugars_g: self.sugars_100g,
            saturated_fat_g: self.saturated_fat_100g,
            sodium_g: self.sodium_100g,
            fiber_g: self.fiber_100g,
            protein_g: self.proteins_100g,
        };
        apply_reported_grade(&mut record, self.nutriscore_grade.as_deref(), self.nutriscore_score);
        record
    }
}

/// One row of a retailer catalogue feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetailerRow {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub categories: Option<MultiValue>,
    #[serde(default)]
    pub labels: Option<MultiValue>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_code")]
    pub code: Option<String>,
    #[serde(default)]
    pub energy_kcal_100g: Option<f64>,
    #[serde(default)]
    pub sugars_100g: Option<f64>,
    #[serde(default)]
    pub saturated_fat_100g: Option<f64>,
    #[serde(default)]
    pub sodium_100g: Option<f64>,
    #[serde(default)]
    pub fiber_100g: Option<f64>,
    #[serde(default)]
    pub proteins_100g: Option<f64>,
    #[serde(default)]
    pub nutriscore_grade: Option<String>,
}

impl RetailerRow {
    /// Lift the row into an uncleaned [`ProductRecord`] for `retailer` in `country`.
    #[must_use]
    pub fn into_record(self, retailer: &str, country: &str, ingest_seq: u64) -> ProductRecord {
        let mut record = ProductRecord::new(RecordSource::retailer(retailer, country), ingest_seq);
        record.code = self.code;
        record.name = self.name;
        record.brand = self.brand;
        record.categories = self.categories.unwrap_or_default();
        record.labels = self.labels.unwrap_or_default();
        record.countries = MultiValue::new(vec![country.to_string()]);
        record.price = self.price.filter(|p| p.is_finite() && *p >= 0.0);
        record.nutrients = Nutrients {
            energy_kcal: self.energy_kcal_100g,
            sugars_g: self.sugars_100g,
            saturated_fat_g: self.saturated_fat_100g,
            sodium_g: self.sodium_100g,
            fiber_g: self.fiber_100g,
            protein_g: self.proteins_100g,
        };
        apply_reported_grade(&mut record, self.nutriscore_grade.as_deref(), None);
        record
    }
}

fn apply_reported_grade(record: &mut ProductRecord, grade: Option<&str>, score: Option<i32>) {
    record.grade = grade.and_then(NutriGrade::parse);
    if record.grade.is_some() {
        record.grade_origin = GradeOrigin::Reported;
        record.nutriscore = score;
    }
}

/// Barcodes arrive as strings or as bare JSON numbers.
fn deserialize_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
