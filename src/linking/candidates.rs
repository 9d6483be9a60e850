//! Country restriction and candidate-cap subsampling of reference records.

use crate::model::{MultiValue, ProductRecord};
use crate::normalize::text::strip_language_prefix;
use std::cmp::Reverse;

const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("at", "austria"),
    ("be", "belgium"),
    ("ch", "switzerland"),
    ("de", "germany"),
    ("dk", "denmark"),
    ("es", "spain"),
    ("fr", "france"),
    ("gb", "united-kingdom"),
    ("ie", "ireland"),
    ("it", "italy"),
    ("lu", "luxembourg"),
    ("nl", "netherlands"),
    ("pl", "poland"),
    ("pt", "portugal"),
    ("se", "sweden"),
    ("uk", "united-kingdom"),
    ("us", "united-states"),
];

fn canonical_country(raw: &str) -> String {
    strip_language_prefix(&raw.trim().to_lowercase())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Accepted spellings of one country: ISO-2 code and dataset tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryFilter {
    names: Vec<String>,
}

impl CountryFilter {
    /// Build a filter from an ISO-2 code, a country name or a tag such as
    /// `en:spain`.
    #[must_use]
    pub fn new(country: &str) -> Self {
        let canonical = canonical_country(country);
        let mut names = vec![canonical.clone()];
        for (code, name) in COUNTRY_ALIASES {
            if canonical == *code {
                names.push((*name).to_string());
            } else if canonical == *name {
                names.push((*code).to_string());
            }
        }
        names.sort();
        names.dedup();
        Self { names }
    }

    /// Whether any of the record's country tags names this country.
    #[must_use]
    pub fn matches(&self, countries: &MultiValue) -> bool {
        countries
            .iter()
            .any(|tag| self.names.contains(&canonical_country(tag)))
    }

    /// Whether a record may be linked within this country. Records without
    /// country tags are of unknown origin and always admitted.
    #[must_use]
    pub fn admits(&self, countries: &MultiValue) -> bool {
        countries.is_empty() || self.matches(countries)
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Reference records eligible for fuzzy scoring.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    /// Reference indices, ascending
    pub indices: Vec<usize>,
    /// Eligible references before the cap was applied
    pub eligible: usize,
    pub truncated: bool,
}

/// Pick the reference records a fuzzy pass may consider.
///
/// Taken records and records tagged only with other countries than
/// `filter` are skipped. When more than
/// `cap` remain, the most complete records are kept (ties by input order),
/// trading recall on sparse records for bounded runtime.
#[must_use]
pub fn select_candidates(
    reference: &[ProductRecord],
    taken: &[bool],
    filter: Option<&CountryFilter>,
    cap: usize,
) -> CandidatePool {
    let mut indices: Vec<usize> = reference
        .iter()
        .enumerate()
        .filter(|(i, _)| !taken.get(*i).copied().unwrap_or(false))
        .filter(|(_, r)| filter.is_none_or(|f| f.admits(&r.countries)))
        .map(|(i, _)| i)
        .collect();

    let eligible = indices.len();
    let truncated = eligible > cap;
    if truncated {
        indices.sort_by_key(|i| (Reverse(reference[*i].completeness()), *i));
        indices.truncate(cap);
        indices.sort_unstable();
    }

    CandidatePool {
        indices,
        eligible,
        truncated,
    }
}
