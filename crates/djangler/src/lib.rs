//! # Djangler
//!
//! Semantic lyric search: find songs by what they mean, not what they say.
//!
//! This crate bundles the ranking engine ([`ranking`]) with the snapshot-backed
//! vector store adapter ([`vecdb`]).
//!
//! ```rust,no_run
//! use djangler::ranking::RankingEngine;
//! use djangler::vecdb::{EmbedderConfig, MemoryVectorStore, RemoteEmbedder, default_snapshot_path};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let embedder = RemoteEmbedder::new(EmbedderConfig::default())?;
//! let store = MemoryVectorStore::open(default_snapshot_path(), embedder)?;
//! let engine = RankingEngine::with_defaults(store)?;
//!
//! for (i, song) in engine.search("childhood memories")?.iter().enumerate() {
//!     println!("{}. {song}", i + 1);
//! }
//! # Ok(())
//! # }
//! ```

pub use djangler_core as ranking;
pub use djangler_vecdb as vecdb;

pub use djangler_core::{
    DjanglerError, GenreTable, RankedResult, RankingEngine, SearchConfig, SectionHit, VectorStore,
};
