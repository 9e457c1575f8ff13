//! Column renaming from source schema identifiers to output identifiers.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rename table: `source column → output column`.
///
/// Renaming touches headers only, never cell values. Columns that have no
/// entry pass through unchanged, and applying the same map twice gives the
/// same result as applying it once as long as no output name is also used as
/// a source name (see [`ColumnMap::is_idempotent`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ColumnMap {
    renames: BTreeMap<String, String>,
}

impl ColumnMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rename. Later entries for the same source replace earlier ones.
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }

    /// Output name for a column.
    #[must_use]
    pub fn map<'a>(&'a self, column: &'a str) -> &'a str {
        self.renames.get(column).map_or(column, String::as_str)
    }

    /// Rename every column in place.
    pub fn apply(&self, columns: &mut [String]) {
        for column in columns.iter_mut() {
            if let Some(to) = self.renames.get(column.as_str()) {
                *column = to.clone();
            }
        }
    }

    /// Renamed copy of a column list.
    #[must_use]
    pub fn mapped(&self, columns: &[String]) -> Vec<String> {
        columns.iter().map(|c| self.map(c).to_string()).collect()
    }

    /// `true` when no output name is itself renamed again.
    #[must_use]
    pub fn is_idempotent(&self) -> bool {
        self.renames.values().all(|to| !self.renames.contains_key(to))
    }

    /// Iterate the `(source, output)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.renames.iter().map(|(f, t)| (f.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }
}
