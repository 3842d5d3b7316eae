use std::path::PathBuf;

use djangler_core::DjanglerError;
use thiserror::Error;

/// Errors raised while loading snapshots or embedding queries.
#[derive(Debug, Error)]
pub enum VecDbError {
    /// No snapshot exists at the expected location.
    #[error("snapshot not found at {0}")]
    SnapshotMissing(PathBuf),

    /// Reading the snapshot failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot or an embedding response is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Stored or query vectors disagree on dimensionality.
    #[error("embedding dimension mismatch: expected {expected}, got {actual} ({context})")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        context: String,
    },

    /// The embedding service could not be reached.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The embedding service answered, but not with a usable vector.
    #[error("embedding service error: {0}")]
    Embedding(String),
}

/// Every adapter failure surfaces to the engine as an unavailable store.
impl From<VecDbError> for DjanglerError {
    fn from(err: VecDbError) -> Self {
        DjanglerError::AdapterUnavailable(err.to_string())
    }
}

/// Result type alias for VecDB operations.
pub type Result<T> = std::result::Result<T, VecDbError>;
