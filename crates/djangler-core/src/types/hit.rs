use serde::{Deserialize, Serialize};

use super::metadata::{Metadata, MetadataExt};
use crate::error::{DjanglerError, Result};

/// Metadata keys shared by the `songs` and `sections` collections.
pub mod keys {
    pub const TITLE: &str = "title";
    pub const ARTIST: &str = "artist";
    pub const URL: &str = "url";
    pub const GENRES: &str = "genres";
    pub const POPULARITY: &str = "popularity";
    /// Older snapshots store the catalog popularity under the artist.
    pub const ARTIST_POPULARITY: &str = "artist_popularity";
    pub const SONG_ID: &str = "song_id";
    pub const SECTION_TYPE: &str = "section_type";
    pub const SECTION_NUMBER: &str = "section_number";
}

/// Section type used when a fragment carries no structural tag.
pub const UNKNOWN_SECTION: &str = "unknown";

/// A single raw nearest-neighbor hit returned by a vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryHit {
    /// Document identifier within its collection.
    pub id: String,
    /// Scalar metadata stored with the document.
    pub metadata: Metadata,
    /// The stored document text, when the store returns it.
    pub document: Option<String>,
    /// Similarity distance (lower is more similar).
    pub distance: f32,
}

impl QueryHit {
    /// Creates a hit with no document text.
    #[must_use]
    pub fn new(id: impl Into<String>, metadata: Metadata, distance: f32) -> Self {
        Self {
            id: id.into(),
            metadata,
            document: None,
            distance,
        }
    }

    /// Attaches the stored document text.
    #[must_use]
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }
}

/// Display metadata for a song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongMetadata {
    pub title: String,
    pub artist: String,
    pub url: Option<String>,
    /// Comma-joined catalog genre list, e.g. `"indie rock, modern rock"`.
    pub genres: String,
    /// Catalog-wide popularity `[0, 100]`.
    pub popularity: u8,
}

impl SongMetadata {
    /// Builds the full snapshot from a `songs` collection hit.
    ///
    /// # Errors
    ///
    /// Returns `DjanglerError::MalformedMetadata` if the title or artist is missing.
    pub fn from_song_hit(hit: &QueryHit) -> Result<Self> {
        let meta = &hit.metadata;
        let (title, artist) = title_and_artist(&hit.id, meta)?;
        Ok(Self {
            title,
            artist,
            url: meta.text(keys::URL).map(str::to_owned),
            genres: meta.text(keys::GENRES).unwrap_or_default().to_owned(),
            popularity: popularity(meta).unwrap_or(0),
        })
    }

    /// Minimal snapshot reconstructed from a section: title, artist and,
    /// when the section carries it, popularity.
    #[must_use]
    pub fn from_section(section: &SectionHit) -> Self {
        Self {
            title: section.title.clone(),
            artist: section.artist.clone(),
            url: None,
            genres: String::new(),
            popularity: section.popularity.unwrap_or(0),
        }
    }

    /// Splits the comma-joined genre list into trimmed, non-empty entries.
    pub fn genre_list(&self) -> impl Iterator<Item = &str> {
        self.genres
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }
}

/// A hit from the `sections` collection: one lyric fragment of a song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionHit {
    /// Identifier of the song owning this fragment.
    pub song_id: String,
    pub title: String,
    pub artist: String,
    /// Lowercase structural tag, e.g. `"verse"` or `"chorus"`.
    pub section_type: String,
    /// 1-based position of the fragment within the song.
    pub section_number: Option<u32>,
    /// Raw lyric text of the fragment.
    pub text: String,
    /// Position in the store's similarity ordering (0 is the best match).
    pub rank: usize,
    /// Similarity distance, passed through from the store unmodified.
    pub distance: f32,
    /// Popularity of the owning song, if the section carries it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u8>,
}

impl SectionHit {
    /// Converts a raw `sections` collection hit found at `rank`.
    ///
    /// # Errors
    ///
    /// Returns `DjanglerError::MalformedMetadata` if the owning song id,
    /// title or artist is missing.
    pub fn from_query_hit(hit: QueryHit, rank: usize) -> Result<Self> {
        let meta = &hit.metadata;
        let song_id = meta
            .text(keys::SONG_ID)
            .map(str::to_owned)
            .or_else(|| meta.integer(keys::SONG_ID).map(|n| n.to_string()))
            .ok_or_else(|| DjanglerError::MalformedMetadata {
                id: hit.id.clone(),
                field: keys::SONG_ID,
            })?;
        let (title, artist) = title_and_artist(&hit.id, meta)?;
        let section_type = meta
            .text(keys::SECTION_TYPE)
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_else(|| UNKNOWN_SECTION.to_owned());
        let section_number = meta
            .integer(keys::SECTION_NUMBER)
            .and_then(|n| u32::try_from(n).ok());

        Ok(Self {
            song_id,
            title,
            artist,
            section_type,
            section_number,
            text: hit.document.unwrap_or_default(),
            rank,
            distance: hit.distance,
            popularity: popularity(meta),
        })
    }
}

/// A section hit together with its rank-derived score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSection {
    #[serde(flatten)]
    pub hit: SectionHit,
    pub score: f32,
}

/// Song popularity, falling back to the artist's, clamped to `[0, 100]`.
fn popularity(meta: &Metadata) -> Option<u8> {
    meta.integer(keys::POPULARITY)
        .or_else(|| meta.integer(keys::ARTIST_POPULARITY))
        .map(|p| p.clamp(0, 100) as u8)
}

fn title_and_artist(id: &str, meta: &Metadata) -> Result<(String, String)> {
    let field = |key: &'static str| {
        meta.text(key)
            .map(str::to_owned)
            .ok_or_else(|| DjanglerError::MalformedMetadata {
                id: id.to_owned(),
                field: key,
            })
    };
    Ok((field(keys::TITLE)?, field(keys::ARTIST)?))
}
