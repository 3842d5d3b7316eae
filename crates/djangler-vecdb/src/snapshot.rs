//! # Index Snapshots
//!
//! A snapshot is a read-only export of both collections with their
//! pre-computed embeddings:
//!
//! ```json
//! {
//!   "songs":    [{"id": "378195", "embedding": [...], "metadata": {...}, "document": "..."}],
//!   "sections": [{"id": "378195_section_0", "embedding": [...], "metadata": {...}}]
//! }
//! ```
//!
//! Files ending in `.gz` are transparently decompressed.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use djangler_core::{Collection, Metadata};
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, VecDbError};

/// File name of the snapshot inside the data directory.
pub const SNAPSHOT_FILE: &str = "lyrics_index.json.gz";

/// Default snapshot location: `<data dir>/djangler/lyrics_index.json.gz`.
pub fn default_snapshot_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("djangler")
        .join(SNAPSHOT_FILE)
}

/// One embedded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub document: Option<String>,
}

/// Both collections of a lyric index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub songs: Vec<StoredDocument>,
    #[serde(default)]
    pub sections: Vec<StoredDocument>,
}

impl Snapshot {
    /// Builds a snapshot, checking that every embedding shares one dimension.
    ///
    /// # Errors
    ///
    /// Returns `VecDbError::DimensionMismatch` naming the first offending document.
    pub fn new(songs: Vec<StoredDocument>, sections: Vec<StoredDocument>) -> Result<Self> {
        let snapshot = Self { songs, sections };
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Loads a snapshot from disk, decompressing `.gz` files.
    ///
    /// # Errors
    ///
    /// Returns `VecDbError::SnapshotMissing` if the file does not exist,
    /// `VecDbError::Json` if it is malformed and
    /// `VecDbError::DimensionMismatch` if embeddings disagree.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(VecDbError::SnapshotMissing(path.to_path_buf()));
        }

        let file = BufReader::new(File::open(path)?);
        let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        let snapshot: Snapshot = serde_json::from_reader(reader)?;
        snapshot.validate()?;

        info!(
            path = %path.display(),
            songs = snapshot.songs.len(),
            sections = snapshot.sections.len(),
            dimension = snapshot.dimension().unwrap_or(0),
            "loaded lyric index snapshot"
        );
        Ok(snapshot)
    }

    /// Documents of one collection.
    #[must_use]
    pub fn documents(&self, collection: Collection) -> &[StoredDocument] {
        match collection {
            Collection::Songs => &self.songs,
            Collection::Sections => &self.sections,
        }
    }

    /// Embedding dimension, or `None` for an empty snapshot.
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.songs
            .iter()
            .chain(&self.sections)
            .next()
            .map(|doc| doc.embedding.len())
    }

    fn validate(&self) -> Result<()> {
        let Some(expected) = self.dimension() else {
            return Ok(());
        };
        for doc in self.songs.iter().chain(&self.sections) {
            if doc.embedding.len() != expected || expected == 0 {
                return Err(VecDbError::DimensionMismatch {
                    expected,
                    actual: doc.embedding.len(),
                    context: format!("document {}", doc.id),
                });
            }
        }
        Ok(())
    }
}
