//! Consumet streaming-aggregator client
//!
//! Resolves playable sources through two provider routes:
//! - `meta/anilist`: the primary catalog (AniList-keyed, with MAL
//!   cross-references)
//! - `anime/gogoanime`: the secondary provider, used when the primary
//!   yields nothing
//!
//! Same resolution order as the metadata client: configured proxy first,
//! upstream directly on failure. Response shapes are tolerated loosely; the
//! aggregator renames keys between providers (`episodes` vs `results`,
//! `isDub` vs `language`).

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::{MirrorServer, PlayableSource, StreamCandidate, StreamEpisode, SubtitleTrack};

/// Default upstream base URL
pub const CONSUMET_URL: &str = "https://api.consumet.org";

/// Streaming aggregator error types
#[derive(Error, Debug)]
pub enum ConsumetError {
    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Sources plus subtitle tracks for one episode/server pair
#[derive(Debug, Clone, Default)]
pub struct SourceBundle {
    pub sources: Vec<PlayableSource>,
    pub subtitles: Vec<SubtitleTrack>,
}

impl SourceBundle {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Consumet streaming client
#[derive(Debug, Clone)]
pub struct ConsumetClient {
    proxy_base: Option<String>,
    direct_base: String,
    client: reqwest::Client,
}

impl ConsumetClient {
    /// Create a client with the default upstream and no proxy
    pub fn new() -> Self {
        Self::with_bases(None, CONSUMET_URL)
    }

    /// Create a client with explicit proxy/upstream bases (also for testing)
    pub fn with_bases(proxy_base: Option<String>, direct_base: impl Into<String>) -> Self {
        Self {
            proxy_base: proxy_base.map(|b| b.trim_end_matches('/').to_string()),
            direct_base: direct_base.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    async fn try_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ConsumetError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                serde_json::from_str(&body)
                    .map_err(|e| ConsumetError::InvalidResponse(format!("JSON parse error: {}", e)))
            }
            status => Err(ConsumetError::Status(status.as_u16())),
        }
    }

    /// Proxy-first fetch; the proxy passes aggregator bodies through
    /// unreshaped, so one parse serves both attempts
    async fn fetch<T: DeserializeOwned>(
        &self,
        proxy_path: &str,
        direct_path: &str,
    ) -> Result<T, ConsumetError> {
        if let Some(base) = &self.proxy_base {
            match self.try_get(&format!("{}{}", base, proxy_path)).await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    tracing::warn!(error = %e, path = proxy_path, "proxy fetch failed, trying upstream");
                }
            }
        }
        self.try_get(&format!("{}{}", self.direct_base, direct_path))
            .await
    }

    // -------------------------------------------------------------------------
    // Primary provider (meta/anilist)
    // -------------------------------------------------------------------------

    /// Title search against the primary catalog
    pub async fn search(&self, query: &str) -> Result<Vec<StreamCandidate>, ConsumetError> {
        let q = urlencoding::encode(query);
        let raw: SearchRaw = self
            .fetch(
                &format!("/api/stream/search?q={}", q),
                &format!("/meta/anilist/{}", q),
            )
            .await?;
        Ok(raw.into_candidates())
    }

    /// Episode list for a primary-catalog entry
    pub async fn episodes(&self, id: &str) -> Result<Vec<StreamEpisode>, ConsumetError> {
        let id_enc = urlencoding::encode(id);
        let raw: InfoRaw = self
            .fetch(
                &format!("/api/stream/info/{}?provider=gogoanime", id_enc),
                &format!("/meta/anilist/info/{}?provider=gogoanime", id_enc),
            )
            .await?;
        Ok(raw.into_episodes())
    }

    /// Playable sources for one episode on one mirror server
    pub async fn watch(
        &self,
        episode_id: &str,
        server: MirrorServer,
    ) -> Result<SourceBundle, ConsumetError> {
        let ep = urlencoding::encode(episode_id);
        let raw: WatchRaw = self
            .fetch(
                &format!("/api/stream/watch/{}?server={}&provider=gogoanime", ep, server),
                &format!("/meta/anilist/watch/{}?server={}&provider=gogoanime", ep, server),
            )
            .await?;
        Ok(raw.into_bundle())
    }

    // -------------------------------------------------------------------------
    // Secondary provider (anime/gogoanime)
    // -------------------------------------------------------------------------

    /// Title search against the secondary provider
    pub async fn gogo_search(&self, query: &str) -> Result<Vec<StreamCandidate>, ConsumetError> {
        let q = urlencoding::encode(query);
        let raw: SearchRaw = self
            .fetch(
                &format!("/api/gogo/search?q={}", q),
                &format!("/anime/gogoanime/{}", q),
            )
            .await?;
        Ok(raw.into_candidates())
    }

    /// Episode list for a secondary-provider entry.
    ///
    /// Gogoanime has no dub flag; a `-dub` marker in the episode id is the
    /// only signal.
    pub async fn gogo_episodes(&self, id: &str) -> Result<Vec<StreamEpisode>, ConsumetError> {
        let id_enc = urlencoding::encode(id);
        let raw: InfoRaw = self
            .fetch(
                &format!("/api/gogo/info/{}", id_enc),
                &format!("/anime/gogoanime/info/{}", id_enc),
            )
            .await?;
        Ok(raw.into_episodes())
    }

    /// Playable sources from the secondary provider
    pub async fn gogo_watch(
        &self,
        episode_id: &str,
        server: MirrorServer,
    ) -> Result<SourceBundle, ConsumetError> {
        let ep = urlencoding::encode(episode_id);
        let raw: WatchRaw = self
            .fetch(
                &format!("/api/gogo/watch/{}?server={}", ep, server),
                &format!("/anime/gogoanime/watch?episodeId={}&server={}", ep, server),
            )
            .await?;
        Ok(raw.into_bundle())
    }
}

impl Default for ConsumetClient {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

/// Ids arrive as strings or numbers depending on provider
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdRaw {
    Num(u64),
    Str(String),
}

impl IdRaw {
    fn into_string(self) -> String {
        match self {
            IdRaw::Num(n) => n.to_string(),
            IdRaw::Str(s) => s,
        }
    }
}

/// Titles arrive as plain strings or `{romaji, english, native}` objects
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TitleRaw {
    Text(String),
    Variants {
        english: Option<String>,
        romaji: Option<String>,
        native: Option<String>,
    },
}

impl TitleRaw {
    fn into_string(self) -> Option<String> {
        match self {
            TitleRaw::Text(s) => Some(s),
            TitleRaw::Variants {
                english,
                romaji,
                native,
            } => english.or(romaji).or(native),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchRaw {
    #[serde(default)]
    results: Vec<CandidateRaw>,
    /// Some proxy deployments rewrap results under `data`
    #[serde(default)]
    data: Vec<CandidateRaw>,
}

impl SearchRaw {
    fn into_candidates(self) -> Vec<StreamCandidate> {
        let rows = if self.results.is_empty() {
            self.data
        } else {
            self.results
        };
        rows.into_iter().map(CandidateRaw::into_candidate).collect()
    }
}

#[derive(Debug, Deserialize)]
struct CandidateRaw {
    id: IdRaw,
    title: Option<TitleRaw>,
    #[serde(rename = "malId")]
    mal_id: Option<u64>,
    #[serde(rename = "isAdult")]
    is_adult: Option<bool>,
}

impl CandidateRaw {
    fn into_candidate(self) -> StreamCandidate {
        StreamCandidate {
            id: self.id.into_string(),
            title: self.title.and_then(TitleRaw::into_string),
            mal_id: self.mal_id,
            is_adult: self.is_adult.unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize)]
struct InfoRaw {
    #[serde(default)]
    episodes: Vec<EpisodeRaw>,
    /// Alternate key used by some provider routes
    #[serde(default)]
    results: Vec<EpisodeRaw>,
}

impl InfoRaw {
    fn into_episodes(self) -> Vec<StreamEpisode> {
        let rows = if self.episodes.is_empty() {
            self.results
        } else {
            self.episodes
        };
        rows.into_iter().map(EpisodeRaw::into_episode).collect()
    }
}

#[derive(Debug, Deserialize)]
struct EpisodeRaw {
    id: Option<IdRaw>,
    #[serde(rename = "episodeId")]
    episode_id: Option<IdRaw>,
    number: Option<u32>,
    #[serde(rename = "episodeNumber")]
    episode_number: Option<u32>,
    /// Plain numeric fallback some routes use instead of `number`
    episode: Option<u32>,
    title: Option<String>,
    #[serde(rename = "isDub")]
    is_dub: Option<bool>,
    language: Option<String>,
}

impl EpisodeRaw {
    fn into_episode(self) -> StreamEpisode {
        let id = self
            .id
            .or(self.episode_id)
            .map(IdRaw::into_string)
            .unwrap_or_default();
        let number = self
            .number
            .or(self.episode_number)
            .or(self.episode)
            .unwrap_or(0);
        let is_dub = self.is_dub.unwrap_or(false)
            || self.language.as_deref() == Some("dub")
            || id.to_lowercase().contains("dub");
        StreamEpisode {
            id,
            number,
            title: self.title,
            is_dub,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WatchRaw {
    #[serde(default)]
    sources: Vec<SourceRaw>,
    #[serde(default)]
    subtitles: Vec<SubtitleRaw>,
}

impl WatchRaw {
    fn into_bundle(self) -> SourceBundle {
        SourceBundle {
            sources: self
                .sources
                .into_iter()
                .filter_map(SourceRaw::into_source)
                .collect(),
            subtitles: self
                .subtitles
                .into_iter()
                .map(|s| SubtitleTrack {
                    url: s.url,
                    lang: s.lang,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SourceRaw {
    url: Option<String>,
    quality: Option<String>,
}

impl SourceRaw {
    fn into_source(self) -> Option<PlayableSource> {
        Some(PlayableSource {
            url: self.url?,
            quality: self.quality,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SubtitleRaw {
    url: String,
    lang: Option<String>,
}
