//! Opportunity scoring.
//!
//! Six components per category are min-max normalized across the ranked set,
//! combined with [`ScoringWeights`] and ranked. A Dirichlet sensitivity pass
//! measures how stable each rank is under random weightings.

mod components;
mod scorer;
mod sensitivity;
mod weights;

pub use components::{Components, NEUTRAL, min_max, normalize_columns};
pub use scorer::{OpportunityScorer, RankedCategory};
pub use sensitivity::{
    SensitivityConfig, SensitivitySummary, analyze as analyze_sensitivity, draw_weights,
    rank_positions,
};
pub use weights::{COMPONENT_COUNT, COMPONENT_NAMES, ScoringWeights};
