use thiserror::Error;

use crate::store::Collection;

/// Errors that can occur during Djangler core operations.
#[derive(Debug, Error)]
pub enum DjanglerError {
    /// The query is empty or contains only whitespace.
    #[error("query is empty or whitespace-only")]
    EmptyQuery,

    /// A collection holds no documents, so there is nothing to match against.
    #[error("collection {collection} has no documents")]
    EmptyCollection {
        /// The collection that was found empty.
        collection: Collection,
    },

    /// The vector store could not be reached or its index is not initialized.
    #[error("vector store unavailable: {0}")]
    AdapterUnavailable(String),

    /// A hit's metadata is missing a required field.
    #[error("hit {id:?} is missing required metadata field {field:?}")]
    MalformedMetadata {
        /// Identifier of the offending hit.
        id: String,
        /// The missing field.
        field: &'static str,
    },

    /// The search configuration is out of range.
    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),

    /// The genre keyword table could not be loaded.
    #[error("invalid genre table: {0}")]
    GenreTable(String),

    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    RegexError(#[from] regex::Error),

    /// Reading a configuration artifact from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DjanglerError {
    /// Returns `true` for failures of the backing store rather than of the query itself.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::AdapterUnavailable(_))
    }
}

/// Result type alias for Djangler operations.
pub type Result<T> = std::result::Result<T, DjanglerError>;
