//! Minimal single-nutrient reduction that makes a nutrient profile healthy.

use crate::model::{NegativeNutrient, Nutrients};
use crate::nutriscore::thresholds::{HEALTHY_SCORE_LIMIT, native_breakpoint};
use crate::nutriscore::{NutriScore, grade};
use serde::{Deserialize, Serialize};

/// How far a category's median product is from a healthy (A/B) grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reformulation {
    /// Median profile already grades A or B
    AlreadyHealthy,
    /// Reducing one nutrient by `reduction_pct` percent reaches grade B
    Feasible {
        nutrient: NegativeNutrient,
        reduction_pct: f64,
        current: f64,
        target: f64,
    },
    /// No single-nutrient reduction reaches grade B
    Infeasible,
    /// A negative-nutrient median is missing
    InsufficientData,
}

impl Reformulation {
    /// Feasibility on [0, 1]: 1 when nothing needs to change, 0 when no
    /// single-nutrient path exists or data is missing.
    #[must_use]
    pub fn feasibility(&self) -> f64 {
        match self {
            Self::AlreadyHealthy => 1.0,
            Self::Feasible { reduction_pct, .. } => (1.0 - reduction_pct / 100.0).clamp(0.0, 1.0),
            Self::Infeasible | Self::InsufficientData => 0.0,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AlreadyHealthy => "already_healthy",
            Self::Feasible { .. } => "feasible",
            Self::Infeasible => "infeasible",
            Self::InsufficientData => "insufficient_data",
        }
    }

    #[must_use]
    pub const fn reduction_pct(&self) -> Option<f64> {
        match self {
            Self::Feasible { reduction_pct, .. } => Some(*reduction_pct),
            _ => None,
        }
    }
}

/// Closed-form reformulation of a median nutrient profile.
///
/// For each negative nutrient with `p` points in a profile scoring `S`,
/// the nutrient may keep at most `k = 2 - (S - p)` points with every other
/// value held fixed. `k < 0` means no reduction of that nutrient suffices;
/// otherwise the largest admissible value is breakpoint `k`. The smallest
/// percentage reduction across nutrients wins, first nutrient on ties.
#[must_use]
pub fn reformulate(profile: &Nutrients) -> Reformulation {
    let Some(NutriScore { score, points, .. }) = grade(profile) else {
        return Reformulation::InsufficientData;
    };
    if score <= HEALTHY_SCORE_LIMIT {
        return Reformulation::AlreadyHealthy;
    }

    let mut best: Option<Reformulation> = None;
    for nutrient in NegativeNutrient::ALL {
        let own = i32::from(points.negative(nutrient));
        let allowed = HEALTHY_SCORE_LIMIT - (score - own);
        let (Ok(index), Some(current)) = (usize::try_from(allowed), profile.negative(nutrient)) else {
            continue;
        };
        let Some(target) = native_breakpoint(nutrient, index) else {
            continue;
        };
        if current <= 0.0 || target >= current {
            continue;
        }
        let reduction_pct = (1.0 - target / current) * 100.0;
        let better = best
            .and_then(|b| b.reduction_pct())
            .is_none_or(|current_best| reduction_pct < current_best);
        if better {
            best = Some(Reformulation::Feasible {
                nutrient,
                reduction_pct,
                current,
                target,
            });
        }
    }
    best.unwrap_or(Reformulation::Infeasible)
}
