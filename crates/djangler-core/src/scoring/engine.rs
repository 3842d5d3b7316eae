//! # Hybrid Relevance Ranking Engine
//!
//! Merges a whole-song similarity search with a lyric-section similarity
//! search into a single ranked list of songs.
//!
//! Pipeline for one call:
//! 1. Detect genre keywords (only when genre boosting is active).
//! 2. Query both collections concurrently with the same text.
//! 3. Score every hit by rank and aggregate per song.
//! 4. Apply genre and popularity multipliers to the combined score.
//! 5. Drop unpopular songs, sort, truncate.

use std::collections::HashSet;
use std::thread;

use tracing::debug;

use super::aggregate::ScoreTable;
use super::config::SearchConfig;
use crate::error::{DjanglerError, Result};
use crate::genre::{GenreTable, PreparedQuery, QueryPreprocessor};
use crate::store::{Collection, VectorStore, bounded_limit};
use crate::types::{QueryHit, RankedResult, SectionHit};

/// Stateless hybrid search over a [`VectorStore`].
///
/// Holds only read-only collaborators, so one engine can serve concurrent
/// callers as long as the store supports concurrent reads.
pub struct RankingEngine<S> {
    store: S,
    preprocessor: QueryPreprocessor,
    config: SearchConfig,
}

impl<S: VectorStore> RankingEngine<S> {
    /// Creates an engine with a default search configuration.
    ///
    /// # Errors
    ///
    /// Returns `DjanglerError::InvalidConfig` if `config` is out of range.
    pub fn new(store: S, genres: GenreTable, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            preprocessor: QueryPreprocessor::new(genres)?,
            config,
        })
    }

    /// Creates an engine with the bundled genre table and default settings.
    pub fn with_defaults(store: S) -> Result<Self> {
        Self::new(store, GenreTable::builtin()?, SearchConfig::default())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn genres(&self) -> &GenreTable {
        self.preprocessor.table()
    }

    /// Searches with the engine's own configuration.
    ///
    /// # Examples
    /// ```
    /// use djangler_core::{Metadata, QueryHit, RankingEngine, StaticStore};
    ///
    /// let mut meta = Metadata::new();
    /// meta.insert("title".into(), "Holocene".into());
    /// meta.insert("artist".into(), "Bon Iver".into());
    /// let store = StaticStore::new(vec![QueryHit::new("1", meta, 0.3)], Vec::new());
    ///
    /// let engine = RankingEngine::with_defaults(store).unwrap();
    /// // The sections collection is empty, so there is nothing to rank.
    /// assert!(engine.search("winter cabin").unwrap().is_empty());
    /// ```
    pub fn search(&self, query: &str) -> Result<Vec<RankedResult>> {
        self.search_with(query, &self.config)
    }

    /// Searches with an explicit configuration.
    ///
    /// An empty collection yields an empty list; a store failure is an error,
    /// even when `result_count` is zero.
    ///
    /// # Errors
    ///
    /// Returns `DjanglerError::EmptyQuery` for a blank query,
    /// `DjanglerError::InvalidConfig` for an out-of-range `config` and
    /// `DjanglerError::AdapterUnavailable` if the store cannot be queried.
    pub fn search_with(&self, query: &str, config: &SearchConfig) -> Result<Vec<RankedResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DjanglerError::EmptyQuery);
        }
        config.validate()?;

        let (song_limit, section_limit) = match self.collection_limits(config) {
            Ok(limits) => limits,
            Err(DjanglerError::EmptyCollection { collection }) => {
                debug!(%collection, "nothing to match against");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        if config.result_count == 0 {
            return Ok(Vec::new());
        }

        let genre_boost = config.genre_boost_active();
        let prepared = if genre_boost {
            self.preprocessor.preprocess(query)
        } else {
            PreparedQuery::passthrough(query)
        };

        let (song_hits, section_hits) =
            self.query_collections(&prepared.text, song_limit, section_limit)?;
        debug!(
            query = %prepared.text,
            genres = prepared.genres.len(),
            song_hits = song_hits.len(),
            section_hits = section_hits.len(),
            "collections queried"
        );

        let mut table = ScoreTable::new();
        table.add_song_hits(song_hits, config.song_query_limit, config.song_weight);
        table.add_section_hits(section_hits, config.section_query_limit, config.section_weight);
        let skipped = table.skipped();

        let mut songs = table.into_scores();
        for song in &mut songs {
            if genre_boost && prepared.has_genres() && song.matches_genres(&prepared.genres) {
                song.score *= config.genre_boost_factor;
                song.genre_boosted = true;
            }
            if config.popularity_boost_active() {
                let factor = config
                    .popularity_curve
                    .factor(song.popularity(), config.max_popularity_boost);
                song.score *= factor;
                song.popularity_boost_factor = factor;
            }
        }

        let candidates = songs.len();
        songs.retain(|song| song.popularity() >= config.min_popularity);

        // Ties fall back to song id so identical inputs rank identically.
        songs.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.song_id.cmp(&b.song_id))
        });

        let mut seen = HashSet::new();
        let results: Vec<RankedResult> = songs
            .into_iter()
            .filter(|song| seen.insert(song.song_id.clone()))
            .take(config.result_count)
            .map(|song| song.into_result())
            .collect();

        debug!(
            candidates,
            skipped,
            returned = results.len(),
            "search complete"
        );
        Ok(results)
    }

    /// Looks up matching lyric sections without song-level aggregation.
    ///
    /// Hits come back in store order with their distances untouched.
    ///
    /// # Errors
    ///
    /// Returns `DjanglerError::EmptyQuery` for a blank query and
    /// `DjanglerError::AdapterUnavailable` if the store cannot be queried.
    pub fn search_sections_only(&self, query: &str, result_count: usize) -> Result<Vec<SectionHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DjanglerError::EmptyQuery);
        }
        let limit = match bounded_limit(&self.store, Collection::Sections, result_count) {
            Ok(limit) => limit,
            Err(DjanglerError::EmptyCollection { collection }) => {
                debug!(%collection, "nothing to match against");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        let hits = self.store.query(Collection::Sections, query, limit)?;
        Ok(hits
            .into_iter()
            .enumerate()
            .filter_map(|(rank, hit)| match SectionHit::from_query_hit(hit, rank) {
                Ok(section) => Some(section),
                Err(e) => {
                    tracing::warn!(rank, error = %e, "skipping section hit");
                    None
                }
            })
            .collect())
    }

    fn collection_limits(&self, config: &SearchConfig) -> Result<(usize, usize)> {
        let songs = bounded_limit(&self.store, Collection::Songs, config.song_query_limit)?;
        let sections =
            bounded_limit(&self.store, Collection::Sections, config.section_query_limit)?;
        Ok((songs, sections))
    }

    /// Issues the song and section queries concurrently.
    fn query_collections(
        &self,
        text: &str,
        song_limit: usize,
        section_limit: usize,
    ) -> Result<(Vec<QueryHit>, Vec<QueryHit>)> {
        thread::scope(|scope| {
            let songs = scope.spawn(|| self.store.query(Collection::Songs, text, song_limit));
            let sections = self.store.query(Collection::Sections, text, section_limit);
            let songs = songs.join().map_err(|_| {
                DjanglerError::AdapterUnavailable("song query worker panicked".into())
            })?;
            Ok((songs?, sections?))
        })
    }
}
