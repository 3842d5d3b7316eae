//! # Djangler VecDB
//!
//! Read-only vector store adapter for the Djangler ranking engine. Serves
//! the `songs` and `sections` collections from an exported index snapshot
//! and embeds queries through a remote model server (Ollama or any
//! OpenAI-compatible endpoint).

pub mod distance;
pub mod embedder;
pub mod error;
pub mod snapshot;
pub mod store;

pub use embedder::{EmbedProvider, Embedder, EmbedderConfig, RemoteEmbedder};
pub use error::{Result, VecDbError};
pub use snapshot::{Snapshot, StoredDocument, default_snapshot_path};
pub use store::MemoryVectorStore;
