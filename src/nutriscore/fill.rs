//! Batched grade fill and grade diagnostics over record sets.

use super::engine::grade;
use crate::model::{GradeOrigin, NutriGrade, ProductRecord};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Grade coverage before and after the fill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCoverageReport {
    pub total: usize,
    pub graded_before: usize,
    /// Grades computed from nutrients by this fill
    pub computed: usize,
    /// Records without a grade whose required nutrients were incomplete
    pub not_computable: usize,
    pub graded_after: usize,
    /// Distribution of the computed grades, A to E
    pub computed_distribution: IndexMap<String, usize>,
}

impl GradeCoverageReport {
    #[must_use]
    pub fn coverage_before(&self) -> f64 {
        ratio(self.graded_before, self.total)
    }

    #[must_use]
    pub fn coverage_after(&self) -> f64 {
        ratio(self.graded_after, self.total)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Fill in missing grades from nutrients.
///
/// Records that already carry a grade are never touched, whatever their
/// nutrients say.
pub fn fill_missing_grades(records: &mut [ProductRecord]) -> GradeCoverageReport {
    let graded_before = records.iter().filter(|r| r.grade.is_some()).count();

    let computed: Vec<Option<NutriGrade>> = records
        .par_iter_mut()
        .map(|record| {
            if record.grade.is_some() {
                return None;
            }
            let result = grade(&record.nutrients)?;
            record.grade = Some(result.grade);
            record.nutriscore = Some(result.score);
            record.grade_origin = GradeOrigin::Computed;
            Some(result.grade)
        })
        .collect();

    let mut distribution: IndexMap<String, usize> = NutriGrade::ALL
        .iter()
        .map(|g| (g.letter().to_string(), 0))
        .collect();
    for g in computed.iter().flatten() {
        *distribution.entry(g.letter().to_string()).or_default() += 1;
    }

    let computed_count = computed.iter().flatten().count();
    let report = GradeCoverageReport {
        total: records.len(),
        graded_before,
        computed: computed_count,
        not_computable: records.len() - graded_before - computed_count,
        graded_after: graded_before + computed_count,
        computed_distribution: distribution,
    };

    tracing::debug!(
        total = report.total,
        graded_before = report.graded_before,
        computed = report.computed,
        not_computable = report.not_computable,
        "grade coverage {:.1}% -> {:.1}%",
        report.coverage_before() * 100.0,
        report.coverage_after() * 100.0
    );
    report
}

/// A (reported, computed) pair that did not agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeDisagreement {
    pub reported: NutriGrade,
    pub computed: NutriGrade,
    pub count: usize,
}

/// Agreement between reported grades and grades computed from the same
/// records' nutrients. Diagnostic only; reported grades are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationReport {
    /// Records with a reported grade and gradable nutrients
    pub compared: usize,
    pub agreed: usize,
    /// Disagreements off by exactly one letter
    pub within_one: usize,
    pub agreement_rate: f64,
    pub disagreements: Vec<GradeDisagreement>,
}

/// Recompute grades of records whose grade was reported by the source.
#[must_use]
pub fn cross_validate(records: &[ProductRecord]) -> CrossValidationReport {
    let pairs: Vec<(NutriGrade, NutriGrade)> = records
        .par_iter()
        .filter(|r| r.grade_origin == GradeOrigin::Reported)
        .filter_map(|r| Some((r.grade?, grade(&r.nutrients)?.grade)))
        .collect();

    let mut matrix: IndexMap<(NutriGrade, NutriGrade), usize> = IndexMap::new();
    let mut report = CrossValidationReport {
        compared: pairs.len(),
        ..CrossValidationReport::default()
    };
    for (reported, computed) in pairs {
        if reported == computed {
            report.agreed += 1;
            continue;
        }
        if reported.index().abs_diff(computed.index()) == 1 {
            report.within_one += 1;
        }
        *matrix.entry((reported, computed)).or_default() += 1;
    }
    matrix.sort_keys();

    report.agreement_rate = ratio(report.agreed, report.compared);
    report.disagreements = matrix
        .into_iter()
        .map(|((reported, computed), count)| GradeDisagreement {
            reported,
            computed,
            count,
        })
        .collect();

    if report.compared > 0 {
        tracing::info!(
            compared = report.compared,
            agreed = report.agreed,
            "grade cross-validation agreement {:.1}%",
            report.agreement_rate * 100.0
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Nutrients, RecordSource};

    fn healthy_nutrients() -> Nutrients {
        Nutrients {
            energy_kcal: Some(50.0),
            sugars_g: Some(1.0),
            saturated_fat_g: Some(0.1),
            sodium_g: Some(0.01),
            fiber_g: Some(5.0),
            protein_g: Some(9.0),
        }
    }

    fn record(grade: Option<NutriGrade>, nutrients: Nutrients) -> ProductRecord {
        let mut r = ProductRecord::new(RecordSource::Reference, 0);
        r.grade = grade;
        if grade.is_some() {
            r.grade_origin = GradeOrigin::Reported;
        }
        r.nutrients = nutrients;
        r
    }

    #[test]
    fn test_existing_grade_never_overridden() {
        let mut records = vec![record(Some(NutriGrade::E), healthy_nutrients())];
        let report = fill_missing_grades(&mut records);
        assert_eq!(records[0].grade, Some(NutriGrade::E));
        assert_eq!(records[0].grade_origin, GradeOrigin::Reported);
        assert_eq!(report.computed, 0);
        assert_eq!(report.graded_after, 1);
    }

    #[test]
    fn test_fill_counts() {
        let mut records = vec![
            record(None, healthy_nutrients()),
            record(None, Nutrients::default()),
            record(Some(NutriGrade::C), Nutrients::default()),
        ];
        let report = fill_missing_grades(&mut records);
        assert_eq!(records[0].grade, Some(NutriGrade::A));
        assert_eq!(records[0].grade_origin, GradeOrigin::Computed);
        assert_eq!(records[1].grade, None);
        assert_eq!(report.graded_before, 1);
        assert_eq!(report.computed, 1);
        assert_eq!(report.not_computable, 1);
        assert_eq!(report.graded_after, 2);
        assert_eq!(report.computed_distribution.get("A"), Some(&1));
    }

    #[test]
    fn test_cross_validation_matrix() {
        let records = vec![
            record(Some(NutriGrade::A), healthy_nutrients()),
            record(Some(NutriGrade::B), healthy_nutrients()),
            record(Some(NutriGrade::E), healthy_nutrients()),
            record(Some(NutriGrade::C), Nutrients::default()),
        ];
        let report = cross_validate(&records);
        assert_eq!(report.compared, 3);
        assert_eq!(report.agreed, 1);
        assert_eq!(report.within_one, 1);
        assert_eq!(report.disagreements.len(), 2);
        assert_eq!(report.disagreements[0].reported, NutriGrade::B);
    }
}
