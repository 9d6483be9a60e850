//! Per-100g nutrient values.

use serde::{Deserialize, Serialize};

/// Per-100g nutrient values of a product. Every field is optional; a
/// missing value is never treated as zero by the grading engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    pub energy_kcal: Option<f64>,
    pub sugars_g: Option<f64>,
    pub saturated_fat_g: Option<f64>,
    pub sodium_g: Option<f64>,
    pub fiber_g: Option<f64>,
    pub protein_g: Option<f64>,
}

impl Nutrients {
    /// Number of nutrient fields carrying a value.
    #[must_use]
    pub fn present_count(&self) -> usize {
        [
            self.energy_kcal,
            self.sugars_g,
            self.saturated_fat_g,
            self.sodium_g,
            self.fiber_g,
            self.protein_g,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.present_count() == 0
    }

    /// Value of one of the four nutrients that add negative points.
    #[must_use]
    pub const fn negative(&self, nutrient: NegativeNutrient) -> Option<f64> {
        match nutrient {
            NegativeNutrient::Energy => self.energy_kcal,
            NegativeNutrient::Sugars => self.sugars_g,
            NegativeNutrient::SaturatedFat => self.saturated_fat_g,
            NegativeNutrient::Sodium => self.sodium_g,
        }
    }

    /// Copy with one negative nutrient replaced.
    #[must_use]
    pub fn with_negative(mut self, nutrient: NegativeNutrient, value: Option<f64>) -> Self {
        match nutrient {
            NegativeNutrient::Energy => self.energy_kcal = value,
            NegativeNutrient::Sugars => self.sugars_g = value,
            NegativeNutrient::SaturatedFat => self.saturated_fat_g = value,
            NegativeNutrient::Sodium => self.sodium_g = value,
        }
        self
    }

    /// Drop values that cannot be a per-100g measurement (non-finite or negative).
    #[must_use]
    pub fn sanitized(self) -> Self {
        let clean = |v: Option<f64>| v.filter(|x| x.is_finite() && *x >= 0.0);
        Self {
            energy_kcal: clean(self.energy_kcal),
            sugars_g: clean(self.sugars_g),
            saturated_fat_g: clean(self.saturated_fat_g),
            sodium_g: clean(self.sodium_g),
            fiber_g: clean(self.fiber_g),
            protein_g: clean(self.protein_g),
        }
    }
}

/// The nutrients that contribute negative points to the Nutri-Score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeNutrient {
    Energy,
    Sugars,
    SaturatedFat,
    Sodium,
}

impl NegativeNutrient {
    pub const ALL: [Self; 4] = [Self::Energy, Self::Sugars, Self::SaturatedFat, Self::Sodium];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Energy => "energy",
            Self::Sugars => "sugars",
            Self::SaturatedFat => "saturated fat",
            Self::Sodium => "sodium",
        }
    }

    /// Unit of the per-100g value stored in [`Nutrients`].
    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::Energy => "kcal",
            _ => "g",
        }
    }
}

impl std::fmt::Display for NegativeNutrient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_drops_invalid_values() {
        let n = Nutrients {
            energy_kcal: Some(f64::NAN),
            sugars_g: Some(-1.0),
            saturated_fat_g: Some(f64::INFINITY),
            sodium_g: Some(0.0),
            fiber_g: None,
            protein_g: Some(3.2),
        }
        .sanitized();
        assert_eq!(n.energy_kcal, None);
        assert_eq!(n.sugars_g, None);
        assert_eq!(n.saturated_fat_g, None);
        assert_eq!(n.sodium_g, Some(0.0));
        assert_eq!(n.present_count(), 2);
    }

    #[test]
    fn test_with_negative_replaces_single_field() {
        let n = Nutrients {
            sugars_g: Some(20.0),
            ..Nutrients::default()
        };
        let changed = n.with_negative(NegativeNutrient::Sugars, Some(5.0));
        assert_eq!(changed.negative(NegativeNutrient::Sugars), Some(5.0));
        assert_eq!(changed.energy_kcal, None);
    }
}
