//! Nutri-Score grading.
//!
//! [`grade`] is a pure function of a per-100g nutrient profile using the
//! published general-food breakpoints. [`fill_missing_grades`] applies it in
//! parallel to every record that has no grade yet and reports coverage;
//! [`cross_validate`] compares reported grades with computed ones.

mod engine;
mod fill;
pub mod thresholds;

pub use engine::{NutriScore, PointBreakdown, grade, grade_values};
pub use fill::{
    CrossValidationReport, GradeCoverageReport, GradeDisagreement, cross_validate,
    fill_missing_grades,
};
