pub mod aggregate;
pub mod config;
pub mod engine;
pub mod popularity;

pub use aggregate::{AggregatedSongScore, ScoreTable, TOP_SECTIONS, rank_score};
pub use config::SearchConfig;
pub use engine::RankingEngine;
pub use popularity::PopularityCurve;
