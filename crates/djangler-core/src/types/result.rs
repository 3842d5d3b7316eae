use serde::{Deserialize, Serialize};

use super::hit::ScoredSection;

/// One song in the output of a hybrid search.
///
/// Sub-scores are reported before any boost; only `score` carries the
/// genre and popularity multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub song_id: String,
    pub title: String,
    pub artist: String,
    pub url: Option<String>,

    /// Catalog genres of the song.
    pub genres: Vec<String>,

    /// Combined, boosted relevance score used for ordering.
    pub score: f32,

    /// Rank-derived score from the whole-song collection.
    pub song_score: f32,

    /// Best rank-derived score among the song's matching sections.
    pub section_score: f32,

    /// Whether the genre boost was applied.
    pub genre_boosted: bool,

    /// Catalog-wide popularity `[0, 100]`.
    pub popularity: u8,

    /// Popularity multiplier applied to `score` (1.0 when disabled).
    pub popularity_boost: f32,

    /// Up to three best-matching sections, best first.
    pub top_sections: Vec<ScoredSection>,
}

impl RankedResult {
    /// Returns the best-matching section, if any section matched.
    #[must_use]
    pub fn best_section(&self) -> Option<&ScoredSection> {
        self.top_sections.first()
    }
}

impl std::fmt::Display for RankedResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.title, self.artist)?;
        write!(
            f,
            " (score={:.2}, song={:.2}, sections={:.2}",
            self.score, self.song_score, self.section_score
        )?;
        if self.genre_boosted {
            write!(f, ", genre-boosted")?;
        }
        if self.popularity_boost != 1.0 {
            write!(f, ", pop x{:.2}", self.popularity_boost)?;
        }
        write!(f, ")")
    }
}
