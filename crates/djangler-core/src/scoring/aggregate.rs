//! Per-song score aggregation across the two collections.

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::types::{QueryHit, RankedResult, ScoredSection, SectionHit, SongMetadata};

/// Sections kept per song in the output.
pub const TOP_SECTIONS: usize = 3;

/// Linear rank decay: the best hit scores `limit × weight`, each following
/// rank one `weight` less. Distances play no part.
#[must_use]
pub fn rank_score(limit: usize, rank: usize, weight: f32) -> f32 {
    limit.saturating_sub(rank) as f32 * weight
}

/// Working record for one song during a single search.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedSongScore {
    pub song_id: String,
    pub song_score: f32,
    /// Best, not summed, section score of the song.
    pub section_score: f32,
    pub metadata: Option<SongMetadata>,
    /// Every matching section, in store order.
    pub sections: Vec<ScoredSection>,
    pub genre_boosted: bool,
    pub popularity_boost_factor: f32,
    /// Combined score after boosts.
    pub score: f32,
}

impl AggregatedSongScore {
    fn new(song_id: &str) -> Self {
        Self {
            song_id: song_id.to_owned(),
            song_score: 0.0,
            section_score: 0.0,
            metadata: None,
            sections: Vec::new(),
            genre_boosted: false,
            popularity_boost_factor: 1.0,
            score: 0.0,
        }
    }

    /// Sum of the sub-scores before any boost.
    #[must_use]
    pub fn base_score(&self) -> f32 {
        self.song_score + self.section_score
    }

    #[must_use]
    pub fn popularity(&self) -> u8 {
        self.metadata.as_ref().map_or(0, |m| m.popularity)
    }

    /// Whether any of `keywords` occurs inside any of the song's genres.
    #[must_use]
    pub fn matches_genres(&self, keywords: &BTreeSet<String>) -> bool {
        let Some(metadata) = &self.metadata else {
            return false;
        };
        metadata.genre_list().any(|genre| {
            let genre = genre.to_lowercase();
            keywords.iter().any(|k| genre.contains(k.as_str()))
        })
    }

    /// Converts into the output record, keeping the best sections.
    #[must_use]
    pub fn into_result(mut self) -> RankedResult {
        self.sections
            .sort_by(|a, b| b.score.total_cmp(&a.score).then(a.hit.rank.cmp(&b.hit.rank)));
        self.sections.truncate(TOP_SECTIONS);

        let metadata = self.metadata.unwrap_or_else(|| SongMetadata {
            title: String::new(),
            artist: String::new(),
            url: None,
            genres: String::new(),
            popularity: 0,
        });
        let genres = metadata.genre_list().map(str::to_owned).collect();

        RankedResult {
            song_id: self.song_id,
            title: metadata.title,
            artist: metadata.artist,
            url: metadata.url,
            genres,
            score: self.score,
            song_score: self.song_score,
            section_score: self.section_score,
            genre_boosted: self.genre_boosted,
            popularity: metadata.popularity,
            popularity_boost: self.popularity_boost_factor,
            top_sections: self.sections,
        }
    }
}

/// Aggregation table keyed by song id, filled on first sight.
#[derive(Debug, Default)]
pub struct ScoreTable {
    songs: HashMap<String, AggregatedSongScore>,
    skipped: usize,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn upsert(&mut self, song_id: &str) -> &mut AggregatedSongScore {
        self.songs
            .entry(song_id.to_owned())
            .or_insert_with(|| AggregatedSongScore::new(song_id))
    }

    /// Scores whole-song hits by rank. Song-level metadata always wins over
    /// anything reconstructed from sections.
    pub fn add_song_hits(&mut self, hits: Vec<QueryHit>, limit: usize, weight: f32) {
        for (rank, hit) in hits.into_iter().enumerate() {
            let metadata = match SongMetadata::from_song_hit(&hit) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(rank, error = %e, "skipping song hit");
                    self.skipped += 1;
                    continue;
                }
            };
            let score = rank_score(limit, rank, weight);
            let entry = self.upsert(&hit.id);
            entry.song_score = entry.song_score.max(score);
            entry.metadata = Some(metadata);
        }
    }

    /// Scores section hits by rank, keeping the best score per song and
    /// retaining every section for display.
    pub fn add_section_hits(&mut self, hits: Vec<QueryHit>, limit: usize, weight: f32) {
        for (rank, hit) in hits.into_iter().enumerate() {
            let section = match SectionHit::from_query_hit(hit, rank) {
                Ok(section) => section,
                Err(e) => {
                    warn!(rank, error = %e, "skipping section hit");
                    self.skipped += 1;
                    continue;
                }
            };
            let score = rank_score(limit, rank, weight);
            let entry = self.upsert(&section.song_id);
            entry.section_score = entry.section_score.max(score);
            if entry.metadata.is_none() {
                entry.metadata = Some(SongMetadata::from_section(&section));
            }
            entry.sections.push(ScoredSection {
                hit: section,
                score,
            });
        }
    }

    /// Number of hits dropped for malformed metadata.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Releases the records with `score` initialized to the base score.
    #[must_use]
    pub fn into_scores(self) -> Vec<AggregatedSongScore> {
        self.songs
            .into_values()
            .map(|mut song| {
                song.score = song.base_score();
                song
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Metadata, MetadataValue};

    fn song(id: &str, genres: &str, popularity: i64) -> QueryHit {
        let mut meta = Metadata::new();
        meta.insert("title".into(), format!("Title {id}").into());
        meta.insert("artist".into(), format!("Artist {id}").into());
        meta.insert("genres".into(), genres.into());
        meta.insert("popularity".into(), popularity.into());
        QueryHit::new(id, meta, 0.2)
    }

    fn section(song_id: &str, kind: &str) -> QueryHit {
        let mut meta = Metadata::new();
        meta.insert("song_id".into(), song_id.into());
        meta.insert("title".into(), format!("Section title {song_id}").into());
        meta.insert("artist".into(), format!("Section artist {song_id}").into());
        meta.insert("section_type".into(), kind.into());
        QueryHit::new(format!("{song_id}_{kind}"), meta, 0.4).with_document("la la la")
    }

    fn by_id(scores: Vec<AggregatedSongScore>) -> HashMap<String, AggregatedSongScore> {
        scores.into_iter().map(|s| (s.song_id.clone(), s)).collect()
    }

    #[test]
    fn rank_score_decays_linearly() {
        assert_eq!(rank_score(50, 0, 0.5), 25.0);
        assert_eq!(rank_score(50, 1, 0.5), 24.5);
        assert_eq!(rank_score(3, 7, 1.0), 0.0);
    }

    #[test]
    fn section_score_is_max_not_sum() {
        let mut table = ScoreTable::new();
        table.add_section_hits(
            vec![section("a", "chorus"), section("b", "verse"), section("a", "verse")],
            100,
            1.0,
        );
        let scores = by_id(table.into_scores());
        let a = &scores["a"];
        assert_eq!(a.section_score, 100.0);
        assert_eq!(a.sections.len(), 2);
        assert_eq!(a.score, 100.0);
    }

    #[test]
    fn song_metadata_preferred_over_section_metadata() {
        let mut table = ScoreTable::new();
        table.add_song_hits(vec![song("a", "rock", 40)], 50, 0.5);
        table.add_section_hits(vec![section("a", "chorus"), section("c", "verse")], 100, 0.6);
        let scores = by_id(table.into_scores());

        let a = scores["a"].metadata.as_ref().unwrap();
        assert_eq!(a.title, "Title a");
        assert_eq!(a.popularity, 40);

        let c = scores["c"].metadata.as_ref().unwrap();
        assert_eq!(c.title, "Section title c");
        assert_eq!(c.artist, "Section artist c");
        assert_eq!(c.popularity, 0);
    }

    #[test]
    fn malformed_hits_are_skipped_but_keep_rank() {
        let mut broken = song("x", "", 0);
        broken.metadata.remove("title");

        let mut table = ScoreTable::new();
        table.add_song_hits(vec![broken, song("b", "", 0)], 50, 1.0);
        assert_eq!(table.skipped(), 1);
        assert_eq!(table.len(), 1);

        let scores = by_id(table.into_scores());
        assert!(!scores.contains_key("x"));
        assert_eq!(scores["b"].song_score, 49.0);
    }

    #[test]
    fn genre_match_is_case_insensitive_substring() {
        let mut table = ScoreTable::new();
        table.add_song_hits(vec![song("a", "Modern Indie Rock, Shoegaze", 10)], 50, 1.0);
        let scores = table.into_scores();

        let keywords: BTreeSet<String> = ["indie rock".to_string()].into();
        assert!(scores[0].matches_genres(&keywords));
        let keywords: BTreeSet<String> = ["jazz".to_string()].into();
        assert!(!scores[0].matches_genres(&keywords));
    }

    #[test]
    fn into_result_keeps_top_three_sections() {
        let mut table = ScoreTable::new();
        table.add_section_hits(
            vec![
                section("a", "verse"),
                section("a", "chorus"),
                section("b", "verse"),
                section("a", "bridge"),
                section("a", "outro"),
            ],
            100,
            1.0,
        );
        let scores = by_id(table.into_scores());
        let result = scores["a"].clone().into_result();

        assert_eq!(result.top_sections.len(), TOP_SECTIONS);
        let kinds: Vec<_> = result
            .top_sections
            .iter()
            .map(|s| s.hit.section_type.as_str())
            .collect();
        assert_eq!(kinds, vec!["verse", "chorus", "bridge"]);
        assert!(
            result
                .top_sections
                .windows(2)
                .all(|w| w[0].score >= w[1].score)
        );
        assert_eq!(result.title, "Section title a");
        assert!(result.genres.is_empty());
    }

    #[test]
    fn numeric_song_ids_in_sections_join_song_hits() {
        let mut meta = Metadata::new();
        meta.insert("song_id".into(), MetadataValue::Int(7));
        meta.insert("title".into(), "T".into());
        meta.insert("artist".into(), "A".into());

        let mut table = ScoreTable::new();
        table.add_song_hits(vec![song("7", "", 0)], 10, 1.0);
        table.add_section_hits(vec![QueryHit::new("7_0", meta, 0.1)], 10, 1.0);
        assert_eq!(table.len(), 1);
        let scores = table.into_scores();
        assert_eq!(scores[0].base_score(), 20.0);
    }
}
