//! Token-sort string similarity on name + brand.

use super::traits::RecordMatcher;
use crate::model::ProductRecord;
use crate::normalize::text::fold_for_matching;
use regex::Regex;
use std::sync::LazyLock;

/// Pack sizes such as "500 g", "1,5l" or "4 x 125 g" in folded text.
static PACK_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b\d+(?:[.,]\d+)?\s*(?:x\s*\d+(?:[.,]\d+)?\s*)?(?:kg|gr|g|mg|ml|cl|dl|lt|l|uds|ud)\b",
    )
    .expect("pack size pattern is valid")
});

/// Remove pack-size tokens, which retailers add to names inconsistently.
#[must_use]
pub fn strip_pack_size(folded: &str) -> String {
    PACK_SIZE.replace_all(folded, " ").into_owned()
}

/// Fold text for comparison, drop pack sizes and sort the tokens, so word
/// order does not matter ("Yogur Natural Hacendado" == "hacendado yogur natural").
#[must_use]
pub fn token_sort_key(text: &str) -> String {
    let folded = strip_pack_size(&fold_for_matching(text));
    let mut tokens: Vec<&str> = folded
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Normalized Levenshtein similarity of two prepared keys, 0 - 100.
///
/// Empty keys carry no evidence and score 0.
#[must_use]
pub fn key_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Token-sort similarity of two raw strings, 0 - 100.
#[must_use]
pub fn token_sort_similarity(a: &str, b: &str) -> f64 {
    key_similarity(&token_sort_key(a), &token_sort_key(b))
}

/// Default matcher: token-sorted, diacritic-folded "name brand" strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSortMatcher;

impl RecordMatcher for TokenSortMatcher {
    fn key(&self, record: &ProductRecord) -> String {
        token_sort_key(&record.match_text())
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        key_similarity(a, b)
    }

    fn name(&self) -> &'static str {
        "token-sort-levenshtein"
    }
}
