//! **Private-label opportunity ranking for food retail.**
//!
//! `pl-opportunity` combines a nutrition reference table (Open Food Facts style
//! exports) with supermarket product catalogues and ranks food categories by
//! how much room they leave for a healthier retailer-owned brand.
//!
//! ## Key Features
//!
//! - **Normalization**: cleans codes, names, brands and tag lists, harmonizes
//!   categories into a two-level hierarchy, flags private-label brands and
//!   deduplicates records with a most-recent-wins rule.
//! - **Nutri-Score**: grades per-100g nutrient profiles, fills missing grades
//!   without ever overriding a reported one and cross-validates reported
//!   grades against computed ones.
//! - **Record Linking**: exact code matching with a fuzzy token-sort fallback,
//!   one-to-one per retailer feed, with match confidence carried into the
//!   enriched table.
//! - **Category Metrics**: poor-grade share, private-label penetration, brand
//!   concentration, reformulation feasibility and price gap per category.
//! - **Opportunity Scoring**: min-max normalized components combined into a
//!   weighted score, with Dirichlet weight sensitivity for rank stability.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: the canonical [`ProductRecord`] and the joined
//!   [`EnrichedProduct`] rows every stage reads and writes.
//! - **[`normalize`]**: the [`Normalizer`] and its lookup tables.
//! - **[`nutriscore`]**: the pure grading function and the grade-fill pass.
//! - **[`linking`]**: the [`Linker`] and its pluggable [`RecordMatcher`].
//! - **[`metrics`]**: per-category aggregates.
//! - **[`scoring`]**: the [`OpportunityScorer`] and sensitivity analysis.
//! - **[`pipeline`]**: loading, schema checks and stage orchestration.
//! - **[`reports`]**: summary, JSON and CSV output.
//!
//! ## Getting Started
//!
//! ```no_run
//! use pl_opportunity::{AppConfig, PipelineInputs, run};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let inputs = PipelineInputs {
//!         reference: "off.jsonl".into(),
//!         retailers: vec!["mercadona:es:mercadona.json".parse()?],
//!     };
//!     let result = run(&inputs, &AppConfig::default())?;
//!
//!     for row in &result.ranking {
//!         println!("{:>2}. {:<24} {:.3}", row.rank, row.key, row.score);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Grading a Single Product
//!
//! ```
//! use pl_opportunity::model::{NutriGrade, Nutrients};
//! use pl_opportunity::nutriscore::grade;
//!
//! let yogurt = Nutrients {
//!     energy_kcal: Some(60.0),
//!     sugars_g: Some(4.0),
//!     saturated_fat_g: Some(1.0),
//!     sodium_g: Some(0.04),
//!     fiber_g: None,
//!     protein_g: Some(4.0),
//! };
//! let score = grade(&yogurt).expect("all negative nutrients present");
//! assert!(score.grade <= NutriGrade::B);
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Counts and indices feed statistical calculations as f64
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::similar_names
)]

pub mod cli;
pub mod config;
pub mod error;
pub mod linking;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod nutriscore;
pub mod pipeline;
pub mod reports;
pub mod scoring;

// Re-export main types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigPreset, OutputConfig};
pub use config::{ConfigError, Validatable};
pub use error::{ErrorContext, OpportunityError, Result};
pub use linking::{LinkConfig, LinkReport, Linker, RecordMatcher};
pub use metrics::{CategoryMetrics, MetricsConfig};
pub use model::{EnrichedProduct, NutriGrade, ProductRecord};
pub use normalize::{CategoryMap, Normalizer, PrivateLabelRegistry};
pub use pipeline::{PipelineInputs, RetailerFeed, RunResult, run};
pub use reports::{ReportFormat, ReportGenerator};
pub use scoring::{OpportunityScorer, RankedCategory, ScoringWeights, SensitivityConfig};
