//! # Query Preprocessor
//!
//! Detects genre keywords in a free-text query. Detection is category-wide:
//! mentioning "punk rock" pulls in every keyword of every category listing
//! that phrase, so later genre comparisons stay permissive. The words of the
//! detected phrases are then stripped from the text sent to the semantic
//! search.

use std::collections::{BTreeSet, HashSet};

use regex::Regex;

use super::table::GenreTable;
use crate::error::Result;

/// A query ready to be sent to the vector store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuery {
    /// Text to embed. Never empty for a non-empty input.
    pub text: String,
    /// Genre keywords detected in the query, expanded to whole categories.
    pub genres: BTreeSet<String>,
}

impl PreparedQuery {
    /// Uses `query` as-is with no genre signal.
    #[must_use]
    pub fn passthrough(query: &str) -> Self {
        Self {
            text: query.to_owned(),
            genres: BTreeSet::new(),
        }
    }

    /// Returns `true` if at least one genre keyword was detected.
    #[must_use]
    pub fn has_genres(&self) -> bool {
        !self.genres.is_empty()
    }
}

/// Extracts genre signals from raw queries using a [`GenreTable`].
#[derive(Debug, Clone)]
pub struct QueryPreprocessor {
    table: GenreTable,
    re_edge_punct: Regex,
}

impl QueryPreprocessor {
    /// Constructs a preprocessor over `table`.
    ///
    /// # Errors
    ///
    /// Returns `DjanglerError::RegexError` if the word pattern fails to
    /// compile (should never happen with the static pattern defined here).
    pub fn new(table: GenreTable) -> Result<Self> {
        Ok(Self {
            table,
            re_edge_punct: Regex::new(r"^[^\w&]+|[^\w&]+$")?,
        })
    }

    #[must_use]
    pub fn table(&self) -> &GenreTable {
        &self.table
    }

    /// Splits `query` into the text to search for and the detected genres.
    ///
    /// Casing is only folded for matching; kept words retain their original
    /// form. If every word was a genre word the raw query is used instead.
    #[must_use]
    pub fn preprocess(&self, query: &str) -> PreparedQuery {
        let lowered = query.to_lowercase();

        let mut genres = BTreeSet::new();
        let mut genre_words = HashSet::new();
        for (_, keywords) in self.table.categories() {
            let found: Vec<&String> = keywords
                .iter()
                .filter(|k| lowered.contains(k.as_str()))
                .collect();
            if found.is_empty() {
                continue;
            }
            genres.extend(keywords.iter().cloned());
            for phrase in found {
                genre_words.extend(phrase.split_whitespace().map(|w| self.bare_word(w)));
            }
        }

        if genres.is_empty() {
            return PreparedQuery::passthrough(query);
        }

        let cleaned = query
            .split_whitespace()
            .filter(|word| !genre_words.contains(&self.bare_word(&word.to_lowercase())))
            .collect::<Vec<_>>()
            .join(" ");

        let text = if cleaned.is_empty() {
            query.to_owned()
        } else {
            cleaned
        };

        PreparedQuery { text, genres }
    }

    /// Strips leading and trailing punctuation so "rock," compares equal to "rock".
    fn bare_word(&self, word: &str) -> String {
        self.re_edge_punct.replace_all(word, "").into_owned()
    }
}
