use serde::{Deserialize, Serialize};

/// Popularity at or below which no boost is granted.
pub const DEFAULT_POPULARITY_FLOOR: u8 = 50;
/// Popularity at which the full boost is reached.
pub const DEFAULT_POPULARITY_CEILING: u8 = 100;

/// Linear ramp mapping catalog popularity to a score multiplier.
///
/// Songs at or below `floor` keep a factor of 1.0; the factor then rises
/// linearly to the configured maximum at `ceiling` and stays there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularityCurve {
    pub floor: u8,
    pub ceiling: u8,
}

impl Default for PopularityCurve {
    fn default() -> Self {
        Self {
            floor: DEFAULT_POPULARITY_FLOOR,
            ceiling: DEFAULT_POPULARITY_CEILING,
        }
    }
}

impl PopularityCurve {
    /// Validates that the ramp is non-degenerate and within the 0-100 scale.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.floor < self.ceiling && self.ceiling <= 100
    }

    /// Multiplier for a song of the given popularity, capped at `max_boost`.
    #[must_use]
    pub fn factor(&self, popularity: u8, max_boost: f32) -> f32 {
        if max_boost == 1.0 || popularity <= self.floor || !self.is_valid() {
            return 1.0;
        }
        let span = f32::from(self.ceiling - self.floor);
        let progress = (f32::from(popularity - self.floor) / span).min(1.0);
        1.0 + (max_boost - 1.0) * progress
    }
}
