//! Djangler Search CLI
//!
//! Runs hybrid semantic lyric searches against a local index snapshot.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use djangler_core::{
    Collection, GenreTable, RankedResult, RankingEngine, SearchConfig, SectionHit, VectorStore,
};
use djangler_vecdb::{
    EmbedProvider, EmbedderConfig, MemoryVectorStore, RemoteEmbedder, default_snapshot_path,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Characters of lyric text shown per matched section.
const SNIPPET_CHARS: usize = 160;

/// CLI arguments
#[derive(Parser)]
#[command(name = "djangler-search")]
#[command(about = "Find songs by what they mean, not what they say")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Index snapshot (.json or .json.gz)
    #[arg(short, long, env = "DJANGLER_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Search configuration file (JSON); flags override its values
    #[arg(short, long, env = "DJANGLER_CONFIG")]
    config: Option<PathBuf>,

    /// Genre keyword table (JSON); defaults to the bundled table
    #[arg(short, long, env = "DJANGLER_GENRES")]
    genres: Option<PathBuf>,

    /// Embedding server base URL
    #[arg(long, env = "DJANGLER_EMBED_URL", default_value = "http://localhost:11434")]
    embed_url: String,

    /// Embedding model name
    #[arg(long, env = "DJANGLER_EMBED_MODEL", default_value = "all-mpnet-base-v2")]
    embed_model: String,

    /// Embedding server protocol: ollama or openai
    #[arg(long, env = "DJANGLER_EMBED_PROVIDER", default_value = "ollama")]
    embed_provider: String,

    /// API key for the embedding server
    #[arg(long, env = "DJANGLER_API_KEY")]
    api_key: Option<String>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank songs by meaning
    Search {
        /// Free-text query, e.g. "indie songs about freedom"
        query: String,

        #[command(flatten)]
        tuning: Tuning,

        /// Hide matched lyric sections
        #[arg(long)]
        no_sections: bool,
    },
    /// Look up individual lyric sections without song ranking
    Sections {
        query: String,

        /// Number of sections to return
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },
    /// Show collection sizes
    Stats,
}

/// Per-search overrides of the configuration file.
#[derive(Args)]
struct Tuning {
    /// Number of songs to return
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Weight of whole-song matches
    #[arg(long)]
    song_weight: Option<f32>,

    /// Weight of lyric-section matches
    #[arg(long)]
    section_weight: Option<f32>,

    /// Genre boost multiplier, at least 1.0 (1.0 disables)
    #[arg(long)]
    genre_boost: Option<f32>,

    /// Disable genre detection entirely
    #[arg(long)]
    no_genre_boost: bool,

    /// Drop songs below this popularity (0-100)
    #[arg(long)]
    min_popularity: Option<u8>,

    /// Multiplier for the most popular songs (1.0 disables)
    #[arg(long)]
    popularity_boost: Option<f32>,

    /// Raw hits requested from the songs collection
    #[arg(long)]
    song_limit: Option<usize>,

    /// Raw hits requested from the sections collection
    #[arg(long)]
    section_limit: Option<usize>,
}

impl Tuning {
    fn apply(&self, mut config: SearchConfig) -> SearchConfig {
        if let Some(count) = self.count {
            config = config.with_result_count(count);
        }
        if self.song_weight.is_some() || self.section_weight.is_some() {
            let song = self.song_weight.unwrap_or(config.song_weight);
            let section = self.section_weight.unwrap_or(config.section_weight);
            config = config.with_weights(song, section);
        }
        if let Some(factor) = self.genre_boost {
            config = config.with_genre_boost(factor);
        }
        if self.no_genre_boost {
            config = config.with_genre_boosting(false);
        }
        if let Some(min) = self.min_popularity {
            config = config.with_min_popularity(min);
        }
        if let Some(boost) = self.popularity_boost {
            config = config.with_popularity_boost(boost);
        }
        if self.song_limit.is_some() || self.section_limit.is_some() {
            let songs = self.song_limit.unwrap_or(config.song_query_limit);
            let sections = self.section_limit.unwrap_or(config.section_query_limit);
            config = config.with_query_limits(songs, sections);
        }
        config
    }
}

fn load_config(path: Option<&Path>) -> Result<SearchConfig> {
    let Some(path) = path else {
        return Ok(SearchConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid config {}", path.display()))
}

fn load_genres(path: Option<&Path>) -> Result<GenreTable> {
    match path {
        Some(path) => GenreTable::from_path(path)
            .with_context(|| format!("Failed to load genre table {}", path.display())),
        None => Ok(GenreTable::builtin()?),
    }
}

fn snippet(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= SNIPPET_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(SNIPPET_CHARS).collect();
    format!("{cut}...")
}

fn print_songs(results: &[RankedResult], show_sections: bool) {
    println!("\nFound {} songs:\n", results.len());
    for (i, song) in results.iter().enumerate() {
        println!("{}. {song}", i + 1);
        if !song.genres.is_empty() {
            let shown: Vec<&str> = song.genres.iter().take(5).map(String::as_str).collect();
            println!("   genres: {}", shown.join(", "));
        }
        if let Some(url) = &song.url {
            println!("   {url}");
        }
        if show_sections {
            if let Some(section) = song.best_section() {
                println!("   [{}] \"{}\"", section.hit.section_type, snippet(&section.hit.text));
            }
        }
        println!();
    }
}

fn print_sections(sections: &[SectionHit]) {
    println!("\nFound {} sections:\n", sections.len());
    for (i, section) in sections.iter().enumerate() {
        let number = section
            .section_number
            .map(|n| format!(" {n}"))
            .unwrap_or_default();
        println!(
            "{}. {} - {} [{}{number}] (distance {:.3})",
            i + 1,
            section.title,
            section.artist,
            section.section_type,
            section.distance
        );
        println!("   \"{}\"\n", snippet(&section.text));
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let provider: EmbedProvider = cli.embed_provider.parse()?;
    let embedder = RemoteEmbedder::new(EmbedderConfig {
        provider,
        base_url: cli.embed_url.clone(),
        model: cli.embed_model.clone(),
        api_key: cli.api_key.clone(),
        ..EmbedderConfig::default()
    })?;

    let snapshot = cli.snapshot.clone().unwrap_or_else(default_snapshot_path);
    info!("Opening index snapshot {}", snapshot.display());
    let store = MemoryVectorStore::open(&snapshot, embedder)
        .with_context(|| format!("Search engine offline: cannot open {}", snapshot.display()))?;

    let config = load_config(cli.config.as_deref())?;
    let genres = load_genres(cli.genres.as_deref())?;
    let engine = RankingEngine::new(store, genres, config)?;

    match &cli.command {
        Commands::Search {
            query,
            tuning,
            no_sections,
        } => {
            let config = tuning.apply(engine.config().clone());
            debug!(?config, "search configuration");
            let results = engine
                .search_with(query, &config)
                .context("Search failed")?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No results found. Try a different query.");
            } else {
                print_songs(&results, !no_sections);
            }
        }
        Commands::Sections { query, count } => {
            let sections = engine
                .search_sections_only(query, *count)
                .context("Section lookup failed")?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&sections)?);
            } else {
                print_sections(&sections);
            }
        }
        Commands::Stats => {
            let songs = engine.store().count(Collection::Songs)?;
            let sections = engine.store().count(Collection::Sections)?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "songs": songs, "sections": sections })
                );
            } else {
                println!("Dataset:  {songs} songs");
                println!("Sections: {sections} lyric fragments");
                println!("Genres:   {} categories", engine.genres().len());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_search_flags() {
        let cli = Cli::try_parse_from([
            "djangler-search",
            "--snapshot",
            "/tmp/index.json",
            "search",
            "indie songs about freedom",
            "-n",
            "5",
            "--genre-boost",
            "2.0",
            "--min-popularity",
            "30",
        ])
        .unwrap();

        assert_eq!(cli.snapshot.as_deref(), Some(Path::new("/tmp/index.json")));
        let Commands::Search { query, tuning, .. } = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(query, "indie songs about freedom");

        let config = tuning.apply(SearchConfig::default());
        assert_eq!(config.result_count, 5);
        assert_eq!(config.genre_boost_factor, 2.0);
        assert_eq!(config.min_popularity, 30);
        assert!(config.enable_genre_boost);
    }

    #[test]
    fn tuning_overrides_one_weight_and_limit() {
        let cli = Cli::try_parse_from([
            "djangler-search",
            "search",
            "q",
            "--section-weight",
            "0.9",
            "--song-limit",
            "20",
        ])
        .unwrap();
        let Commands::Search { tuning, .. } = cli.command else {
            panic!("expected search command");
        };

        let config = tuning.apply(SearchConfig::default());
        assert_eq!(config.song_weight, 0.5);
        assert_eq!(config.section_weight, 0.9);
        assert_eq!(config.song_query_limit, 20);
        assert_eq!(config.section_query_limit, 100);
    }

    #[test]
    fn tuning_disables_genre_boost() {
        let cli = Cli::try_parse_from(["djangler-search", "search", "q", "--no-genre-boost"])
            .unwrap();
        let Commands::Search { tuning, .. } = cli.command else {
            panic!("expected search command");
        };
        assert!(!tuning.apply(SearchConfig::default()).genre_boost_active());
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), SearchConfig::default());
        assert!(load_config(Some(Path::new("/nonexistent/djangler.json"))).is_err());
    }

    #[test]
    fn builtin_genres_without_path() {
        assert!(!load_genres(None).unwrap().is_empty());
    }

    #[test]
    fn snippet_flattens_and_truncates() {
        assert_eq!(snippet("line one\nline   two"), "line one line two");
        let long = "la ".repeat(100);
        let cut = snippet(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), SNIPPET_CHARS + 3);
    }
}
