use serde::{Deserialize, Serialize};

use super::popularity::PopularityCurve;
use crate::error::{DjanglerError, Result};

/// Default search parameters.
pub const DEFAULT_RESULT_COUNT: usize = 10;
pub const DEFAULT_SONG_WEIGHT: f32 = 0.5;
pub const DEFAULT_SECTION_WEIGHT: f32 = 0.6;
pub const DEFAULT_SONG_QUERY_LIMIT: usize = 50;
pub const DEFAULT_SECTION_QUERY_LIMIT: usize = 100;
pub const DEFAULT_GENRE_BOOST: f32 = 1.5;

/// Parameters of a hybrid search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of songs returned.
    pub result_count: usize,
    /// Multiplier for rank-derived scores from the `songs` collection.
    pub song_weight: f32,
    /// Multiplier for rank-derived scores from the `sections` collection.
    pub section_weight: f32,
    /// Hits requested from the `songs` collection; also the rank-score base.
    pub song_query_limit: usize,
    /// Hits requested from the `sections` collection; also the rank-score base.
    pub section_query_limit: usize,
    /// Whether genre keywords in the query may boost matching songs.
    pub enable_genre_boost: bool,
    /// Multiplier for songs whose genres match the query, at least 1.0
    /// (1.0 disables).
    pub genre_boost_factor: f32,
    /// Songs below this popularity are dropped from the output.
    pub min_popularity: u8,
    /// Multiplier granted to the most popular songs (1.0 disables).
    pub max_popularity_boost: f32,
    /// Shape of the popularity boost.
    pub popularity_curve: PopularityCurve,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_count: DEFAULT_RESULT_COUNT,
            song_weight: DEFAULT_SONG_WEIGHT,
            section_weight: DEFAULT_SECTION_WEIGHT,
            song_query_limit: DEFAULT_SONG_QUERY_LIMIT,
            section_query_limit: DEFAULT_SECTION_QUERY_LIMIT,
            enable_genre_boost: true,
            genre_boost_factor: DEFAULT_GENRE_BOOST,
            min_popularity: 0,
            max_popularity_boost: 1.0,
            popularity_curve: PopularityCurve::default(),
        }
    }
}

impl SearchConfig {
    /// Create a new search configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of songs to return.
    pub fn with_result_count(mut self, count: usize) -> Self {
        self.result_count = count;
        self
    }

    /// Set the song-level and section-level weights.
    pub fn with_weights(mut self, song_weight: f32, section_weight: f32) -> Self {
        self.song_weight = song_weight;
        self.section_weight = section_weight;
        self
    }

    /// Set how many raw hits are requested from each collection.
    pub fn with_query_limits(mut self, song_query_limit: usize, section_query_limit: usize) -> Self {
        self.song_query_limit = song_query_limit;
        self.section_query_limit = section_query_limit;
        self
    }

    /// Set the genre boost multiplier.
    pub fn with_genre_boost(mut self, factor: f32) -> Self {
        self.genre_boost_factor = factor;
        self
    }

    /// Enable or disable genre boosting.
    pub fn with_genre_boosting(mut self, enabled: bool) -> Self {
        self.enable_genre_boost = enabled;
        self
    }

    /// Set the minimum popularity a song needs to be returned.
    pub fn with_min_popularity(mut self, min_popularity: u8) -> Self {
        self.min_popularity = min_popularity.min(100);
        self
    }

    /// Set the popularity boost ceiling.
    pub fn with_popularity_boost(mut self, max_boost: f32) -> Self {
        self.max_popularity_boost = max_boost;
        self
    }

    /// Set the popularity ramp.
    pub fn with_popularity_curve(mut self, curve: PopularityCurve) -> Self {
        self.popularity_curve = curve;
        self
    }

    /// Genre boosting runs only when enabled with a factor other than 1.0.
    #[must_use]
    pub fn genre_boost_active(&self) -> bool {
        self.enable_genre_boost && self.genre_boost_factor != 1.0
    }

    #[must_use]
    pub fn popularity_boost_active(&self) -> bool {
        self.max_popularity_boost != 1.0
    }

    /// Checks that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns `DjanglerError::InvalidConfig` describing the first offending field.
    pub fn validate(&self) -> Result<()> {
        let non_negative = |name: &str, value: f32| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(DjanglerError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative number, got {value}"
                )))
            }
        };
        non_negative("song_weight", self.song_weight)?;
        non_negative("section_weight", self.section_weight)?;

        if !self.genre_boost_factor.is_finite() || self.genre_boost_factor < 1.0 {
            return Err(DjanglerError::InvalidConfig(format!(
                "genre_boost_factor must be at least 1.0, got {}",
                self.genre_boost_factor
            )));
        }
        if !self.max_popularity_boost.is_finite() || self.max_popularity_boost < 1.0 {
            return Err(DjanglerError::InvalidConfig(format!(
                "max_popularity_boost must be at least 1.0, got {}",
                self.max_popularity_boost
            )));
        }
        if self.song_query_limit == 0 || self.section_query_limit == 0 {
            return Err(DjanglerError::InvalidConfig(
                "query limits must be positive".into(),
            ));
        }
        if self.min_popularity > 100 {
            return Err(DjanglerError::InvalidConfig(format!(
                "min_popularity must be within 0-100, got {}",
                self.min_popularity
            )));
        }
        if !self.popularity_curve.is_valid() {
            return Err(DjanglerError::InvalidConfig(format!(
                "popularity curve floor {} must be below ceiling {} (max 100)",
                self.popularity_curve.floor, self.popularity_curve.ceiling
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.genre_boost_active());
        assert!(!config.popularity_boost_active());
    }

    #[test]
    fn builder_sets_fields() {
        let config = SearchConfig::new()
            .with_result_count(5)
            .with_weights(1.0, 2.0)
            .with_query_limits(10, 20)
            .with_genre_boost(2.5)
            .with_min_popularity(30)
            .with_popularity_boost(1.4);

        assert_eq!(config.result_count, 5);
        assert_eq!(config.song_weight, 1.0);
        assert_eq!(config.section_weight, 2.0);
        assert_eq!(config.song_query_limit, 10);
        assert_eq!(config.section_query_limit, 20);
        assert_eq!(config.genre_boost_factor, 2.5);
        assert_eq!(config.min_popularity, 30);
        assert!(config.popularity_boost_active());
    }

    #[test]
    fn min_popularity_clamped() {
        let config = SearchConfig::new().with_min_popularity(250);
        assert_eq!(config.min_popularity, 100);
    }

    #[test]
    fn genre_boost_inactive_when_disabled_or_neutral() {
        assert!(!SearchConfig::new().with_genre_boosting(false).genre_boost_active());
        assert!(!SearchConfig::new().with_genre_boost(1.0).genre_boost_active());
    }

    #[test]
    fn invalid_values_rejected() {
        let cases = [
            SearchConfig::new().with_weights(-0.1, 0.6),
            SearchConfig::new().with_weights(0.5, f32::NAN),
            SearchConfig::new().with_genre_boost(f32::INFINITY),
            SearchConfig::new().with_genre_boost(0.0),
            SearchConfig::new().with_genre_boost(0.75),
            SearchConfig::new().with_popularity_boost(0.5),
            SearchConfig::new().with_query_limits(0, 100),
            SearchConfig::new().with_popularity_curve(PopularityCurve {
                floor: 90,
                ceiling: 40,
            }),
        ];
        for config in cases {
            let err = config.validate().unwrap_err();
            assert!(matches!(err, DjanglerError::InvalidConfig(_)), "{config:?}");
        }
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"result_count": 3, "min_popularity": 25}"#).unwrap();
        assert_eq!(config.result_count, 3);
        assert_eq!(config.min_popularity, 25);
        assert_eq!(config.song_weight, DEFAULT_SONG_WEIGHT);
        assert_eq!(config.popularity_curve, PopularityCurve::default());
    }
}
