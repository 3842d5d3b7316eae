use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DjanglerError, Result};

const BUILTIN_GENRES: &str = include_str!("genres.json");

/// Static mapping from genre category to the keyword phrases that signal it.
///
/// Keywords are stored trimmed and lower-cased. Categories iterate in name
/// order, so anything derived from the table is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenreTable {
    categories: BTreeMap<String, Vec<String>>,
}

impl GenreTable {
    /// Builds a table from `(category, keywords)` pairs, normalizing keywords
    /// and dropping blank ones.
    pub fn new<C, K, S>(categories: C) -> Self
    where
        C: IntoIterator<Item = (S, K)>,
        K: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = BTreeMap::new();
        for (category, keywords) in categories {
            let normalized: Vec<String> = keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
            if normalized.is_empty() {
                continue;
            }
            let entry: &mut Vec<String> = table
                .entry(category.as_ref().trim().to_lowercase())
                .or_default();
            for keyword in normalized {
                if !entry.contains(&keyword) {
                    entry.push(keyword);
                }
            }
        }
        Self { categories: table }
    }

    /// The table bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns `DjanglerError::GenreTable` if the bundled JSON is invalid
    /// (should never happen).
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_GENRES)
    }

    /// Parses a JSON object of `{"category": ["keyword", ...]}`.
    ///
    /// # Errors
    ///
    /// Returns `DjanglerError::GenreTable` if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<String>> =
            serde_json::from_str(json).map_err(|e| DjanglerError::GenreTable(e.to_string()))?;
        Ok(Self::new(raw))
    }

    /// Loads a table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `DjanglerError::Io` if the file cannot be read and
    /// `DjanglerError::GenreTable` if it is malformed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Iterates over `(category, keywords)` in category order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(name, keywords)| (name.as_str(), keywords.as_slice()))
    }

    /// Keywords of a single category.
    #[must_use]
    pub fn keywords(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
