//! Published Nutri-Score breakpoints for general foods (per 100 g).
//!
//! Tables are kept in their published units. Comparisons happen in the
//! units stored on [`Nutrients`](crate::model::Nutrients) by dividing each
//! breakpoint by [`native_divisor`], so a value equal to a converted
//! breakpoint always lands in the lower band.

use crate::model::NegativeNutrient;

/// kJ per kcal.
pub const KJ_PER_KCAL: f64 = 4.184;

pub const ENERGY_KJ: [f64; 10] = [
    335.0, 670.0, 1005.0, 1340.0, 1675.0, 2010.0, 2345.0, 2680.0, 3015.0, 3350.0,
];
pub const SUGARS_G: [f64; 10] = [4.5, 9.0, 13.5, 18.0, 22.5, 27.0, 31.0, 36.0, 40.0, 45.0];
pub const SATURATED_FAT_G: [f64; 10] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
pub const SODIUM_MG: [f64; 10] = [
    90.0, 180.0, 270.0, 360.0, 450.0, 540.0, 630.0, 720.0, 810.0, 900.0,
];

pub const FIBER_G: [f64; 5] = [0.9, 1.9, 2.8, 3.7, 4.7];
pub const PROTEIN_G: [f64; 5] = [1.6, 3.2, 4.8, 6.4, 8.0];

/// Highest number of points a negative nutrient can contribute.
pub const MAX_NEGATIVE_POINTS: u8 = 10;

/// Highest final score that still earns a healthy (A/B) grade.
pub const HEALTHY_SCORE_LIMIT: i32 = 2;

/// Published breakpoints of a negative nutrient.
#[must_use]
pub const fn negative_table(nutrient: NegativeNutrient) -> &'static [f64; 10] {
    match nutrient {
        NegativeNutrient::Energy => &ENERGY_KJ,
        NegativeNutrient::Sugars => &SUGARS_G,
        NegativeNutrient::SaturatedFat => &SATURATED_FAT_G,
        NegativeNutrient::Sodium => &SODIUM_MG,
    }
}

/// Factor between a published breakpoint and the stored unit
/// (kJ -> kcal, mg -> g).
#[must_use]
pub const fn native_divisor(nutrient: NegativeNutrient) -> f64 {
    match nutrient {
        NegativeNutrient::Energy => KJ_PER_KCAL,
        NegativeNutrient::Sodium => 1000.0,
        NegativeNutrient::Sugars | NegativeNutrient::SaturatedFat => 1.0,
    }
}

/// Breakpoint `index` of a negative nutrient, in stored units.
#[must_use]
pub fn native_breakpoint(nutrient: NegativeNutrient, index: usize) -> Option<f64> {
    negative_table(nutrient)
        .get(index)
        .map(|t| t / native_divisor(nutrient))
}

/// Number of breakpoints strictly exceeded by `value`.
#[must_use]
pub fn points_above(value: f64, table: &[f64], divisor: f64) -> u8 {
    let exceeded = table.iter().filter(|t| value > **t / divisor).count();
    u8::try_from(exceeded).unwrap_or(u8::MAX)
}

/// Points of a negative nutrient given its stored-unit value.
#[must_use]
pub fn negative_points(nutrient: NegativeNutrient, value: f64) -> u8 {
    points_above(value, negative_table(nutrient), native_divisor(nutrient))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_value_stays_in_lower_band() {
        assert_eq!(points_above(4.5, &SUGARS_G, 1.0), 0);
        assert_eq!(points_above(4.51, &SUGARS_G, 1.0), 1);
        assert_eq!(points_above(45.0, &SUGARS_G, 1.0), 9);
        assert_eq!(points_above(100.0, &SUGARS_G, 1.0), 10);
    }

    #[test]
    fn test_sodium_converted_from_grams() {
        assert_eq!(negative_points(NegativeNutrient::Sodium, 0.09), 0);
        assert_eq!(negative_points(NegativeNutrient::Sodium, 0.1), 1);
        assert_eq!(negative_points(NegativeNutrient::Sodium, 1.0), 10);
    }

    #[test]
    fn test_energy_converted_from_kcal() {
        // 100 kcal = 418.4 kJ
        assert_eq!(negative_points(NegativeNutrient::Energy, 100.0), 1);
        // 80 kcal = 334.7 kJ
        assert_eq!(negative_points(NegativeNutrient::Energy, 80.0), 0);
        let first = native_breakpoint(NegativeNutrient::Energy, 0).expect("breakpoint");
        assert_eq!(negative_points(NegativeNutrient::Energy, first), 0);
    }
}
