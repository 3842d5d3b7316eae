use std::path::Path;

use djangler_core::{Collection, QueryHit, VectorStore};
use tracing::debug;

use crate::distance::cosine_distance;
use crate::embedder::Embedder;
use crate::error::{Result, VecDbError};
use crate::snapshot::Snapshot;

/// Exhaustive nearest-neighbor search over an in-memory [`Snapshot`].
pub struct MemoryVectorStore<E> {
    snapshot: Snapshot,
    embedder: E,
}

impl<E: Embedder> MemoryVectorStore<E> {
    pub fn new(snapshot: Snapshot, embedder: E) -> Self {
        Self { snapshot, embedder }
    }

    /// Loads the snapshot at `path` and serves it with `embedder`.
    ///
    /// # Errors
    ///
    /// See [`Snapshot::load`].
    pub fn open(path: impl AsRef<Path>, embedder: E) -> Result<Self> {
        Ok(Self::new(Snapshot::load(path)?, embedder))
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn nearest(&self, collection: Collection, text: &str, max_results: usize) -> Result<Vec<QueryHit>> {
        let documents = self.snapshot.documents(collection);
        if documents.is_empty() || max_results == 0 {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(text)?;
        if let Some(expected) = self.snapshot.dimension() {
            if query.len() != expected {
                return Err(VecDbError::DimensionMismatch {
                    expected,
                    actual: query.len(),
                    context: "query embedding".into(),
                });
            }
        }

        let mut scored: Vec<(usize, f32)> = documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (i, cosine_distance(&query, &doc.embedding)))
            .collect();
        // Stable sort keeps snapshot order among equal distances.
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(max_results);

        debug!(%collection, scanned = documents.len(), returned = scored.len(), "nearest neighbors");

        Ok(scored
            .into_iter()
            .map(|(i, distance)| {
                let doc = &documents[i];
                QueryHit {
                    id: doc.id.clone(),
                    metadata: doc.metadata.clone(),
                    document: doc.document.clone(),
                    distance,
                }
            })
            .collect())
    }
}

impl<E: Embedder> VectorStore for MemoryVectorStore<E> {
    fn count(&self, collection: Collection) -> djangler_core::Result<usize> {
        Ok(self.snapshot.documents(collection).len())
    }

    fn query(
        &self,
        collection: Collection,
        text: &str,
        max_results: usize,
    ) -> djangler_core::Result<Vec<QueryHit>> {
        Ok(self.nearest(collection, text, max_results)?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use djangler_core::{Metadata, RankingEngine, SearchConfig};

    use super::*;
    use crate::snapshot::StoredDocument;

    /// Maps known phrases to fixed vectors.
    struct PhraseEmbedder(HashMap<&'static str, Vec<f32>>);

    impl Embedder for PhraseEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.0
                .get(text)
                .cloned()
                .ok_or_else(|| VecDbError::Embedding(format!("unknown phrase {text}")))
        }
    }

    fn embedder() -> PhraseEmbedder {
        PhraseEmbedder(HashMap::from([
            ("heartbreak", vec![1.0, 0.0, 0.0]),
            ("summer", vec![0.0, 1.0, 0.0]),
            ("wrong size", vec![1.0, 0.0]),
        ]))
    }

    fn song(id: &str, embedding: Vec<f32>) -> StoredDocument {
        let mut metadata = Metadata::new();
        metadata.insert("title".into(), format!("Song {id}").into());
        metadata.insert("artist".into(), "Someone".into());
        metadata.insert("popularity".into(), 50_i64.into());
        StoredDocument {
            id: id.into(),
            embedding,
            metadata,
            document: None,
        }
    }

    fn section(song_id: &str, n: usize, embedding: Vec<f32>) -> StoredDocument {
        let mut metadata = Metadata::new();
        metadata.insert("song_id".into(), song_id.into());
        metadata.insert("title".into(), format!("Song {song_id}").into());
        metadata.insert("artist".into(), "Someone".into());
        metadata.insert("section_type".into(), "verse".into());
        StoredDocument {
            id: format!("{song_id}_section_{n}"),
            embedding,
            metadata,
            document: Some(format!("verse {n} of {song_id}")),
        }
    }

    fn store() -> MemoryVectorStore<PhraseEmbedder> {
        let snapshot = Snapshot::new(
            vec![
                song("sad", vec![0.9, 0.1, 0.0]),
                song("sunny", vec![0.1, 0.9, 0.0]),
                song("other", vec![0.0, 0.0, 1.0]),
            ],
            vec![
                section("sunny", 0, vec![0.0, 1.0, 0.1]),
                section("sad", 0, vec![1.0, 0.0, 0.2]),
                section("sad", 1, vec![0.7, 0.7, 0.0]),
            ],
        )
        .unwrap();
        MemoryVectorStore::new(snapshot, embedder())
    }

    #[test]
    fn counts_per_collection() {
        let store = store();
        assert_eq!(store.count(Collection::Songs).unwrap(), 3);
        assert_eq!(store.count(Collection::Sections).unwrap(), 3);
    }

    #[test]
    fn query_orders_by_distance() {
        let hits = store().query(Collection::Songs, "heartbreak", 2).unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["sad", "sunny"]);
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[test]
    fn section_hits_carry_documents() {
        let hits = store().query(Collection::Sections, "summer", 1).unwrap();
        assert_eq!(hits[0].id, "sunny_section_0");
        assert_eq!(hits[0].document.as_deref(), Some("verse 0 of sunny"));
    }

    #[test]
    fn embedder_failure_is_unavailable() {
        let err = store().query(Collection::Songs, "unknown", 1).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn query_dimension_checked() {
        let err = store().query(Collection::Songs, "wrong size", 1).unwrap_err();
        assert!(err.to_string().contains("dimension mismatch"));
    }

    #[test]
    fn missing_snapshot_is_unavailable() {
        let result = MemoryVectorStore::open("/nonexistent/djangler/index.json", embedder());
        let err: djangler_core::DjanglerError = result.err().unwrap().into();
        assert!(err.is_unavailable());
    }

    #[test]
    fn drives_the_ranking_engine() {
        let engine = RankingEngine::with_defaults(store()).unwrap();
        let config = SearchConfig::new().with_result_count(2);
        let results = engine.search_with("heartbreak", &config).unwrap();

        assert_eq!(results[0].song_id, "sad");
        assert_eq!(results[0].top_sections.len(), 2);
        assert!(results.len() <= 2);

        let sections = engine.search_sections_only("summer", 5).unwrap();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].song_id, "sunny");
    }
}
