//! Text cleaning primitives used by the normalizer and the linker.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Decompose to NFKD and drop combining marks ("Nestlé" -> "Nestle").
#[must_use]
pub fn strip_diacritics(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Trim and collapse runs of whitespace to a single space.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical brand: first of a comma/slash separated list, diacritics
/// stripped, lowercased, whitespace collapsed. Empty results are `None`.
#[must_use]
pub fn normalize_brand(raw: &str) -> Option<String> {
    let first = raw.split([',', '/']).next().unwrap_or_default();
    let cleaned = collapse_whitespace(&strip_diacritics(first).to_lowercase());
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Display name: trimmed with whitespace collapsed; case is preserved.
#[must_use]
pub fn normalize_name(raw: &str) -> Option<String> {
    let cleaned = collapse_whitespace(raw);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// External code with every whitespace character removed.
#[must_use]
pub fn normalize_code(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Category, label or country tag: trimmed and lowercased.
#[must_use]
pub fn normalize_tag(raw: &str) -> Option<String> {
    let cleaned = raw.trim().to_lowercase();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Tag without its `xx:` language prefix, if it has one.
#[must_use]
pub fn strip_language_prefix(tag: &str) -> &str {
    match tag.split_once(':') {
        Some((prefix, rest)) if prefix.len() == 2 && !rest.is_empty() => rest,
        _ => tag,
    }
}

/// Lowercase, diacritic-free form used for similarity comparison.
#[must_use]
pub fn fold_for_matching(text: &str) -> String {
    collapse_whitespace(&strip_diacritics(text).to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_brand_variants_collapse() {
        for raw in ["Nestlé", "NESTLÉ", "  nestle ", "Nestle, Nestlé Waters", "Nestlé/Purina"] {
            assert_eq!(normalize_brand(raw).as_deref(), Some("nestle"), "raw = {raw:?}");
        }
    }

    #[test]
    fn test_normalize_brand_empty_is_none() {
        assert_eq!(normalize_brand(""), None);
        assert_eq!(normalize_brand("  , other"), None);
        assert_eq!(normalize_brand("/"), None);
    }

    #[test]
    fn test_normalize_brand_is_idempotent() {
        let once = normalize_brand("  AH   Biologisch / AH").expect("brand");
        assert_eq!(once, "ah biologisch");
        assert_eq!(normalize_brand(&once).as_deref(), Some(once.as_str()));
    }

    #[test]
    fn test_normalize_code_strips_inner_whitespace() {
        assert_eq!(normalize_code(" 841 0032 ").as_deref(), Some("8410032"));
        assert_eq!(normalize_code("   "), None);
    }

    #[test]
    fn test_strip_language_prefix() {
        assert_eq!(strip_language_prefix("en:yogurts"), "yogurts");
        assert_eq!(strip_language_prefix("yogurts"), "yogurts");
        assert_eq!(strip_language_prefix("long:tag"), "long:tag");
    }

    #[test]
    fn test_fold_for_matching() {
        assert_eq!(fold_for_matching("  Café  Crème "), "cafe creme");
    }
}
