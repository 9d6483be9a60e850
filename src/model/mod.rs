//! Canonical data model shared by every pipeline stage.
//!
//! Raw input rows ([`ReferenceRow`], [`RetailerRow`]) are lifted into
//! [`ProductRecord`]s, cleaned by the normalizer, graded, linked and finally
//! joined into [`EnrichedProduct`] rows that the category metrics read.

mod category;
mod enriched;
mod grade;
mod multi_value;
mod nutrients;
mod product;

pub use category::{Category, CategoryLevel, UNKNOWN_CATEGORY};
pub use enriched::{EnrichedProduct, MatchMethod, RetailerMatch};
pub use grade::{GradeOrigin, NutriGrade};
pub use multi_value::MultiValue;
pub use nutrients::{NegativeNutrient, Nutrients};
pub use product::{ProductRecord, RecordSource, ReferenceRow, RetailerRow};
