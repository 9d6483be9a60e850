//! Pure Nutri-Score computation for a single nutrient profile.

use super::thresholds::{FIBER_G, PROTEIN_G, negative_points, points_above};
use crate::model::{NegativeNutrient, NutriGrade, Nutrients};
use serde::{Deserialize, Serialize};

/// Points awarded per component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointBreakdown {
    pub energy: u8,
    pub sugars: u8,
    pub saturated_fat: u8,
    pub sodium: u8,
    pub fiber: u8,
    pub protein: u8,
}

impl PointBreakdown {
    #[must_use]
    pub const fn negative_total(&self) -> i32 {
        self.energy as i32 + self.sugars as i32 + self.saturated_fat as i32 + self.sodium as i32
    }

    #[must_use]
    pub const fn positive_total(&self) -> i32 {
        self.fiber as i32 + self.protein as i32
    }

    /// Points of one negative nutrient.
    #[must_use]
    pub const fn negative(&self, nutrient: NegativeNutrient) -> u8 {
        match nutrient {
            NegativeNutrient::Energy => self.energy,
            NegativeNutrient::Sugars => self.sugars,
            NegativeNutrient::SaturatedFat => self.saturated_fat,
            NegativeNutrient::Sodium => self.sodium,
        }
    }
}

/// Result of grading a nutrient profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutriScore {
    /// Negative minus positive points
    pub score: i32,
    pub grade: NutriGrade,
    pub points: PointBreakdown,
}

/// Grade a per-100g nutrient profile.
///
/// Returns `None` when energy, sugars, saturated fat or sodium is missing
/// (NaN counts as missing). Missing fiber or protein score zero points,
/// which can only worsen the grade. Fruit, vegetable and nut content is not
/// available in the source data and is always taken as zero.
#[must_use]
pub fn grade(nutrients: &Nutrients) -> Option<NutriScore> {
    let present = |v: Option<f64>| v.filter(|x| !x.is_nan());

    let mut points = PointBreakdown::default();
    for nutrient in NegativeNutrient::ALL {
        let value = present(nutrients.negative(nutrient))?;
        let p = negative_points(nutrient, value);
        match nutrient {
            NegativeNutrient::Energy => points.energy = p,
            NegativeNutrient::Sugars => points.sugars = p,
            NegativeNutrient::SaturatedFat => points.saturated_fat = p,
            NegativeNutrient::Sodium => points.sodium = p,
        }
    }
    points.fiber = present(nutrients.fiber_g).map_or(0, |v| points_above(v, &FIBER_G, 1.0));
    points.protein = present(nutrients.protein_g).map_or(0, |v| points_above(v, &PROTEIN_G, 1.0));

    let score = points.negative_total() - points.positive_total();
    Some(NutriScore {
        score,
        grade: NutriGrade::from_score(score),
        points,
    })
}

/// Grade from individual per-100g values (energy in kcal, sodium in g).
#[must_use]
pub fn grade_values(
    energy_kcal: Option<f64>,
    sugars_g: Option<f64>,
    saturated_fat_g: Option<f64>,
    sodium_g: Option<f64>,
    fiber_g: Option<f64>,
    protein_g: Option<f64>,
) -> Option<NutriScore> {
    grade(&Nutrients {
        energy_kcal,
        sugars_g,
        saturated_fat_g,
        sodium_g,
        fiber_g,
        protein_g,
    })
}
