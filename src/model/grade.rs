//! Nutri-Score letter grades and where a record's grade came from.

use serde::{Deserialize, Serialize};

/// Nutri-Score letter grade.
///
/// No "not applicable" variant exists: source values such as
/// `not-applicable`, `unknown` or an empty string parse to `None` and are
/// handled exactly like a missing grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NutriGrade {
    A,
    B,
    C,
    D,
    E,
}

impl NutriGrade {
    /// All grades, best first.
    pub const ALL: [Self; 5] = [Self::A, Self::B, Self::C, Self::D, Self::E];

    /// Map a final Nutri-Score (general foods) to its letter.
    ///
    /// Cutoffs: A <= -1, B 0..=2, C 3..=10, D 11..=18, E >= 19.
    #[must_use]
    pub const fn from_score(score: i32) -> Self {
        match score {
            i32::MIN..=-1 => Self::A,
            0..=2 => Self::B,
            3..=10 => Self::C,
            11..=18 => Self::D,
            _ => Self::E,
        }
    }

    /// Parse a grade as delivered by a source table.
    ///
    /// Returns `None` for anything other than a single letter A-E, which
    /// covers the "not applicable" and "unknown" sentinels.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "a" => Some(Self::A),
            "b" => Some(Self::B),
            "c" => Some(Self::C),
            "d" => Some(Self::D),
            "e" => Some(Self::E),
            _ => None,
        }
    }

    #[must_use]
    pub const fn letter(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }

    /// Healthy grades are A and B.
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        matches!(self, Self::A | Self::B)
    }

    /// Poor grades are C, D and E.
    #[must_use]
    pub const fn is_poor(&self) -> bool {
        !self.is_healthy()
    }

    /// Position in [`NutriGrade::ALL`].
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
            Self::E => 4,
        }
    }
}

impl std::fmt::Display for NutriGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.letter())
    }
}

/// Provenance of the grade currently held by a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeOrigin {
    /// Grade supplied by the source table
    Reported,
    /// Grade filled in from nutrient values
    Computed,
    /// No grade available
    #[default]
    Missing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_cutoffs() {
        assert_eq!(NutriGrade::from_score(-15), NutriGrade::A);
        assert_eq!(NutriGrade::from_score(-1), NutriGrade::A);
        assert_eq!(NutriGrade::from_score(0), NutriGrade::B);
        assert_eq!(NutriGrade::from_score(2), NutriGrade::B);
        assert_eq!(NutriGrade::from_score(3), NutriGrade::C);
        assert_eq!(NutriGrade::from_score(10), NutriGrade::C);
        assert_eq!(NutriGrade::from_score(11), NutriGrade::D);
        assert_eq!(NutriGrade::from_score(18), NutriGrade::D);
        assert_eq!(NutriGrade::from_score(19), NutriGrade::E);
        assert_eq!(NutriGrade::from_score(40), NutriGrade::E);
    }

    #[test]
    fn test_parse_sentinels_are_missing() {
        assert_eq!(NutriGrade::parse("a"), Some(NutriGrade::A));
        assert_eq!(NutriGrade::parse(" E "), Some(NutriGrade::E));
        assert_eq!(NutriGrade::parse("not-applicable"), None);
        assert_eq!(NutriGrade::parse("not applicable"), None);
        assert_eq!(NutriGrade::parse("unknown"), None);
        assert_eq!(NutriGrade::parse(""), None);
    }

    #[test]
    fn test_healthy_and_poor_partition() {
        for grade in NutriGrade::ALL {
            assert_ne!(grade.is_healthy(), grade.is_poor());
        }
        assert!(NutriGrade::B.is_healthy());
        assert!(NutriGrade::C.is_poor());
    }
}
