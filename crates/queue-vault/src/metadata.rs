//! Case-insensitive metadata maps attached to queues.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered key/value metadata with case-insensitive keys.
///
/// Keys are normalized to ASCII lowercase on insert and lookup, so
/// `Color` and `color` address the same entry. Iteration order is the
/// lexicographic order of the normalized keys. This is the single place
/// case-insensitive key comparison is defined; every queue metadata
/// surface reuses it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataMap {
    entries: BTreeMap<String, String>,
}

impl MetadataMap {
    /// Create an empty metadata map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair, replacing any entry whose key differs
    /// only by case. Returns the previous value if one existed.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.to_ascii_lowercase(), value.into())
    }

    /// Look up a value by key, ignoring case
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Remove an entry by key, ignoring case
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(&key.to_ascii_lowercase())
    }

    /// Check whether a key is present, ignoring case
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_ascii_lowercase())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in normalized-key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for MetadataMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(&key, value);
        }
        map
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for MetadataMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
