//! Data structures and types for anitui
//!
//! Contains all shared models used across the application organized by domain:
//! - **Catalog**: Jikan listing cards and full detail records
//! - **Episodes**: Jikan episode metadata and pagination
//! - **Streaming**: Consumet search hits, episodes, and playable sources

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Catalog Models (Jikan)
// =============================================================================

/// Minimal listing-card representation of one title
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub mal_id: u64,
    pub title: String,
    pub title_english: Option<String>,
    pub image_url: Option<String>,
    pub large_image_url: Option<String>,
    pub score: Option<f32>,
    /// Content type as reported upstream ("tv", "movie", "ova", ...)
    pub kind: Option<String>,
    pub year: Option<u16>,
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year_str = self.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        match self.score {
            Some(s) => write!(f, "{}{} ★ {:.2}", self.title, year_str, s),
            None => write!(f, "{}{}", self.title, year_str),
        }
    }
}

/// Genre name with its upstream id (usable for genre browsing)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
    pub mal_id: Option<u64>,
}

/// External streaming link advertised by the metadata provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalLink {
    pub name: String,
    pub url: String,
}

/// Full metadata for one title
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailRecord {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub synopsis: Option<String>,
    pub episodes: Option<u32>,
    pub duration: Option<String>,
    pub trailer_youtube_id: Option<String>,
    pub genres: Vec<Genre>,
    pub studios: Vec<String>,
    pub producers: Vec<String>,
    /// Alternate titles in upstream order
    pub titles: Vec<String>,
    pub status: Option<String>,
    pub season: Option<String>,
    pub streaming: Vec<ExternalLink>,
}

impl DetailRecord {
    /// Title used when querying the streaming catalog.
    ///
    /// English title when the provider has one, else the display title.
    /// English titles match the aggregator's slugs far more often.
    pub fn search_title(&self) -> &str {
        self.entry
            .title_english
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.entry.title)
    }
}

impl fmt::Display for DetailRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let eps = self
            .episodes
            .map(|e| format!("{} eps", e))
            .unwrap_or_else(|| "? eps".to_string());
        write!(f, "{} - {}", self.entry, eps)
    }
}

// =============================================================================
// Episode Models (Jikan)
// =============================================================================

/// One row of the metadata provider's episode list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeMeta {
    pub mal_id: u64,
    pub number: u32,
    pub title: String,
    pub aired: Option<String>,
    pub filler: bool,
    pub recap: bool,
}

impl fmt::Display for EpisodeMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:02} - {}", self.number, self.title)
    }
}

/// Pagination echo from the episode list endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub last_visible_page: u32,
    pub has_next_page: bool,
}

/// Episode list page: rows plus whatever pagination the upstream exposes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodePage {
    pub data: Vec<EpisodeMeta>,
    pub pagination: Pagination,
}

// =============================================================================
// Streaming Models (Consumet)
// =============================================================================

/// Subtitled vs dubbed-audio episode variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioVariant {
    #[default]
    Sub,
    Dub,
}

impl AudioVariant {
    pub fn is_dub(&self) -> bool {
        matches!(self, AudioVariant::Dub)
    }

    /// Other variant (for toggle keys)
    pub fn toggled(&self) -> Self {
        match self {
            AudioVariant::Sub => AudioVariant::Dub,
            AudioVariant::Dub => AudioVariant::Sub,
        }
    }
}

impl fmt::Display for AudioVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioVariant::Sub => write!(f, "SUB"),
            AudioVariant::Dub => write!(f, "DUB"),
        }
    }
}

/// Mirror server offering an episode's video source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MirrorServer {
    #[default]
    GogoCdn,
    Vidstreaming,
    StreamSb,
}

impl MirrorServer {
    /// Wire name used in upstream query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            MirrorServer::GogoCdn => "gogocdn",
            MirrorServer::Vidstreaming => "vidstreaming",
            MirrorServer::StreamSb => "streamsb",
        }
    }

    pub fn all() -> &'static [MirrorServer] {
        &[
            MirrorServer::GogoCdn,
            MirrorServer::Vidstreaming,
            MirrorServer::StreamSb,
        ]
    }

    /// Parse a wire name, tolerating case
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gogocdn" => Some(MirrorServer::GogoCdn),
            "vidstreaming" => Some(MirrorServer::Vidstreaming),
            "streamsb" => Some(MirrorServer::StreamSb),
            _ => None,
        }
    }
}

impl fmt::Display for MirrorServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Streaming-catalog entry hypothesized to correspond to a catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamCandidate {
    pub id: String,
    pub title: Option<String>,
    /// Cross-reference back to the metadata provider's numeric id
    pub mal_id: Option<u64>,
    pub is_adult: bool,
}

impl fmt::Display for StreamCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(t) => write!(f, "{} [{}]", t, self.id),
            None => write!(f, "[{}]", self.id),
        }
    }
}

/// Episode row from the streaming aggregator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEpisode {
    /// Identifier used to request sources
    pub id: String,
    pub number: u32,
    pub title: Option<String>,
    pub is_dub: bool,
}

impl fmt::Display for StreamEpisode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = if self.is_dub { " [DUB]" } else { "" };
        match &self.title {
            Some(t) => write!(f, "E{:02} - {}{}", self.number, t, tag),
            None => write!(f, "E{:02}{}", self.number, tag),
        }
    }
}

/// One playable source URL with optional quality label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayableSource {
    pub url: String,
    pub quality: Option<String>,
}

impl PlayableSource {
    /// Whether the URL points at an adaptive-streaming manifest
    pub fn is_adaptive(&self) -> bool {
        self.url.to_lowercase().contains(".m3u8")
    }
}

impl fmt::Display for PlayableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.quality {
            Some(q) => write!(f, "[{}] {}", q, self.url),
            None => write!(f, "{}", self.url),
        }
    }
}

/// Subtitle track descriptor accompanying a source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub url: String,
    pub lang: Option<String>,
}

/// Prefer an adaptive-streaming manifest, else the first source verbatim.
///
/// No reachability validation: the URL goes straight to the player.
pub fn pick_source(sources: &[PlayableSource]) -> Option<&PlayableSource> {
    sources
        .iter()
        .find(|s| s.is_adaptive())
        .or_else(|| sources.first())
}

// =============================================================================
// Unit Tests
// =============================================================================
