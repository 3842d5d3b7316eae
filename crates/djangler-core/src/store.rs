//! # Vector Store Seam
//!
//! The ranking engine never touches embeddings or indexes directly. It talks
//! to a [`VectorStore`], which answers nearest-neighbor queries against the
//! two named collections.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{DjanglerError, Result};
use crate::types::QueryHit;

/// The two collections a lyric index holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Whole-song embeddings.
    Songs,
    /// Lyric-section embeddings (verse, chorus, ...), tagged with their song.
    Sections,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Songs, Collection::Sections];

    /// The collection's name in the store.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Songs => "songs",
            Self::Sections => "sections",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read access to a semantic index.
///
/// Implementations must be safe for concurrent reads: the engine issues the
/// song and section queries from separate threads.
pub trait VectorStore: Send + Sync {
    /// Number of documents in `collection`.
    fn count(&self, collection: Collection) -> Result<usize>;

    /// Returns at most `max_results` hits for `text`, best match first.
    ///
    /// Callers never pass a `max_results` larger than [`VectorStore::count`].
    fn query(&self, collection: Collection, text: &str, max_results: usize)
    -> Result<Vec<QueryHit>>;
}

impl<S: VectorStore + ?Sized> VectorStore for Arc<S> {
    fn count(&self, collection: Collection) -> Result<usize> {
        (**self).count(collection)
    }

    fn query(
        &self,
        collection: Collection,
        text: &str,
        max_results: usize,
    ) -> Result<Vec<QueryHit>> {
        (**self).query(collection, text, max_results)
    }
}

impl<S: VectorStore + ?Sized> VectorStore for &S {
    fn count(&self, collection: Collection) -> Result<usize> {
        (**self).count(collection)
    }

    fn query(
        &self,
        collection: Collection,
        text: &str,
        max_results: usize,
    ) -> Result<Vec<QueryHit>> {
        (**self).query(collection, text, max_results)
    }
}

/// Caps `limit` at the collection's size.
///
/// # Errors
///
/// Returns `DjanglerError::EmptyCollection` when the collection holds no
/// documents, so a zero-sized query is never sent to the store.
pub fn bounded_limit<S: VectorStore + ?Sized>(
    store: &S,
    collection: Collection,
    limit: usize,
) -> Result<usize> {
    match store.count(collection)? {
        0 => Err(DjanglerError::EmptyCollection { collection }),
        count => Ok(limit.min(count)),
    }
}

/// A store that replays fixed, pre-ordered hits regardless of the query text.
///
/// Useful for exercising the ranking engine without an embedding model.
#[derive(Debug, Clone, Default)]
pub struct StaticStore {
    songs: Vec<QueryHit>,
    sections: Vec<QueryHit>,
    offline: bool,
}

impl StaticStore {
    /// Creates a store whose collections answer with `songs` and `sections`, in order.
    #[must_use]
    pub fn new(songs: Vec<QueryHit>, sections: Vec<QueryHit>) -> Self {
        Self {
            songs,
            sections,
            offline: false,
        }
    }

    /// A store that fails every call with `AdapterUnavailable`.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    fn hits(&self, collection: Collection) -> Result<&[QueryHit]> {
        if self.offline {
            return Err(DjanglerError::AdapterUnavailable(
                "static store is offline".into(),
            ));
        }
        Ok(match collection {
            Collection::Songs => &self.songs,
            Collection::Sections => &self.sections,
        })
    }
}

impl VectorStore for StaticStore {
    fn count(&self, collection: Collection) -> Result<usize> {
        Ok(self.hits(collection)?.len())
    }

    fn query(
        &self,
        collection: Collection,
        _text: &str,
        max_results: usize,
    ) -> Result<Vec<QueryHit>> {
        let hits = self.hits(collection)?;
        Ok(hits.iter().take(max_results).cloned().collect())
    }
}
