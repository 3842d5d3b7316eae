//! # Djangler Core
//!
//! Finds songs by what they mean, not what they say. Provides the hybrid
//! relevance ranking engine that merges whole-song and lyric-section
//! similarity searches, the genre-aware query preprocessor, and the
//! vector store seam both sit on.
//!
//! ## Quick Start
//!
//! ```rust
//! use djangler_core::{GenreTable, QueryPreprocessor};
//!
//! let preprocessor = QueryPreprocessor::new(GenreTable::builtin().unwrap()).unwrap();
//! let prepared = preprocessor.preprocess("indie rock rebellion");
//!
//! assert_eq!(prepared.text, "rebellion");
//! assert!(prepared.genres.contains("bedroom pop"));
//! ```
pub mod error;
pub mod genre;
pub mod scoring;
pub mod store;
pub mod types;

// Re-export primary API
pub use error::{DjanglerError, Result};
pub use genre::{GenreTable, PreparedQuery, QueryPreprocessor};
pub use scoring::{PopularityCurve, RankingEngine, SearchConfig};
pub use store::{Collection, StaticStore, VectorStore};
pub use types::{
    Metadata, MetadataExt, MetadataValue, QueryHit, RankedResult, ScoredSection, SectionHit,
    SongMetadata,
};
