//! Ordered multi-valued field container.

use serde::{Deserialize, Serialize};

/// Ordered sequence of strings used for every multi-valued field
/// (category tags, labels, countries).
///
/// Source tables deliver these either as a JSON array or as a single
/// comma-separated string. Both shapes are accepted at deserialization time
/// and the core only ever sees the ordered sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawMultiValue")]
pub struct MultiValue(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMultiValue {
    List(Vec<Option<String>>),
    Delimited(String),
}

impl From<RawMultiValue> for MultiValue {
    fn from(raw: RawMultiValue) -> Self {
        match raw {
            RawMultiValue::List(items) => items.into_iter().flatten().collect(),
            RawMultiValue::Delimited(text) => Self::from_delimited(&text),
        }
    }
}

impl MultiValue {
    #[must_use]
    pub const fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    /// Split a comma-separated string, keeping empty segments out.
    #[must_use]
    pub fn from_delimited(text: &str) -> Self {
        text.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    /// Apply a cleaning function to each value, dropping values it rejects.
    #[must_use]
    pub fn filter_map(&self, f: impl Fn(&str) -> Option<String>) -> Self {
        self.0.iter().filter_map(|v| f(v)).collect()
    }
}

impl FromIterator<String> for MultiValue {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for MultiValue {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

impl<'a> IntoIterator for &'a MultiValue {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
