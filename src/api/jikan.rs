//! Jikan (MyAnimeList) API client
//!
//! Read-only metadata queries: trending, popular, latest season, search,
//! detail, episodes, recommendations, genre and type browsing.
//! API docs: https://docs.api.jikan.moe
//!
//! Every operation resolves in order: the configured proxy first, then the
//! upstream directly. An error surfaces only when both attempts fail.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::{
    CatalogEntry, DetailRecord, EpisodeMeta, EpisodePage, ExternalLink, Genre, Pagination,
};

/// Default upstream base URL
pub const JIKAN_URL: &str = "https://api.jikan.moe/v4";

/// Metadata API error types
#[derive(Error, Debug)]
pub enum JikanError {
    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Jikan metadata client
#[derive(Debug, Clone)]
pub struct JikanClient {
    /// Local proxy base (e.g. "http://localhost:8585"), tried first when set
    proxy_base: Option<String>,
    /// Upstream base, the fallback
    direct_base: String,
    client: reqwest::Client,
}

impl JikanClient {
    /// Create a client with the default upstream and no proxy
    pub fn new() -> Self {
        Self::with_bases(None, JIKAN_URL)
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

    /// One GET attempt against one URL
    async fn try_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, JikanError> {
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
                    .map_err(|e| JikanError::InvalidResponse(format!("JSON parse error: {}", e)))
            }
            status => Err(JikanError::Status(status.as_u16())),
        }
    }

    /// Proxy-first fetch for endpoints whose proxy and upstream bodies share
    /// a shape
    async fn fetch<T: DeserializeOwned>(
        &self,
        proxy_path: &str,
        direct_path: &str,
    ) -> Result<T, JikanError> {
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

    async fn fetch_list(
        &self,
        proxy_path: &str,
        direct_path: &str,
    ) -> Result<Vec<CatalogEntry>, JikanError> {
        let env: Envelope<Vec<AnimeRaw>> = self.fetch(proxy_path, direct_path).await?;
        Ok(env.data.into_iter().map(AnimeRaw::into_entry).collect())
    }

    /// Currently-airing titles
    pub async fn trending(&self) -> Result<Vec<CatalogEntry>, JikanError> {
        self.fetch_list("/api/anime/trending", "/top/anime?filter=airing&limit=18")
            .await
    }

    /// Top-rated TV titles
    pub async fn popular(&self) -> Result<Vec<CatalogEntry>, JikanError> {
        self.fetch_list("/api/anime/popular", "/top/anime?type=tv&limit=18")
            .await
    }

    /// Current-season titles
    pub async fn latest(&self) -> Result<Vec<CatalogEntry>, JikanError> {
        self.fetch_list("/api/anime/latest", "/seasons/now?limit=18")
            .await
    }

    /// Free-text title search, popularity-ordered upstream
    pub async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>, JikanError> {
        let q = urlencoding::encode(query);
        self.fetch_list(
            &format!("/api/anime/search?q={}", q),
            &format!("/anime?q={}&sfw=true&order_by=popularity&sort=desc&limit=24", q),
        )
        .await
    }

    /// Browse by genre id list (comma-separated upstream ids)
    pub async fn by_genre(&self, ids: &str, limit: u32) -> Result<Vec<CatalogEntry>, JikanError> {
        let ids = urlencoding::encode(ids);
        self.fetch_list(
            &format!("/api/anime/genre?ids={}&limit={}", ids, limit),
            &format!("/anime?genres={}&order_by=popularity&sort=desc&limit={}", ids, limit),
        )
        .await
    }

    /// Browse by content type ("tv", "movie", ...)
    pub async fn by_type(&self, kind: &str, limit: u32) -> Result<Vec<CatalogEntry>, JikanError> {
        let kind = urlencoding::encode(kind);
        self.fetch_list(
            &format!("/api/anime/type?type={}&limit={}", kind, limit),
            &format!("/anime?type={}&order_by=popularity&sort=desc&limit={}", kind, limit),
        )
        .await
    }

    /// Full detail record for one title.
    ///
    /// The proxy returns the detail object bare while the upstream wraps it
    /// in `{data: ...}`, so the two attempts parse different envelopes.
    pub async fn info(&self, id: u64) -> Result<DetailRecord, JikanError> {
        if let Some(base) = &self.proxy_base {
            match self
                .try_get::<DetailRaw>(&format!("{}/api/anime/info/{}", base, id))
                .await
            {
                Ok(raw) => return Ok(raw.into_detail()),
                Err(e) => {
                    tracing::warn!(error = %e, id, "proxy info fetch failed, trying upstream");
                }
            }
        }
        let env: Envelope<DetailRaw> = self
            .try_get(&format!("{}/anime/{}/full", self.direct_base, id))
            .await?;
        Ok(env.data.into_detail())
    }

    /// One page of the episode list
    pub async fn episodes(&self, id: u64, page: u32) -> Result<EpisodePage, JikanError> {
        let raw: EpisodePageRaw = self
            .fetch(
                &format!("/api/anime/episodes/{}?page={}", id, page),
                &format!("/anime/{}/episodes?page={}", id, page),
            )
            .await?;
        Ok(raw.into_page())
    }

    /// Recommended titles for one title.
    ///
    /// The proxy pre-unwraps the upstream's `{entry: ...}` rows.
    pub async fn recommendations(&self, id: u64) -> Result<Vec<CatalogEntry>, JikanError> {
        if let Some(base) = &self.proxy_base {
            match self
                .try_get::<Envelope<Vec<AnimeRaw>>>(&format!(
                    "{}/api/anime/recommendations/{}",
                    base, id
                ))
                .await
            {
                Ok(env) => return Ok(env.data.into_iter().map(AnimeRaw::into_entry).collect()),
                Err(e) => {
                    tracing::warn!(error = %e, id, "proxy recommendations failed, trying upstream");
                }
            }
        }
        let env: Envelope<Vec<RecommendationRaw>> = self
            .try_get(&format!("{}/anime/{}/recommendations", self.direct_base, id))
            .await?;
        Ok(env
            .data
            .into_iter()
            .filter_map(|r| r.entry)
            .map(AnimeRaw::into_entry)
            .collect())
    }
}

impl Default for JikanClient {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct AnimeRaw {
    mal_id: u64,
    title: Option<String>,
    title_english: Option<String>,
    images: Option<ImagesRaw>,
    score: Option<f32>,
    #[serde(rename = "type")]
    kind: Option<String>,
    year: Option<u16>,
}

impl AnimeRaw {
    fn into_entry(self) -> CatalogEntry {
        let jpg = self.images.and_then(|i| i.jpg);
        CatalogEntry {
            mal_id: self.mal_id,
            title: self.title.unwrap_or_default(),
            title_english: self.title_english,
            image_url: jpg.as_ref().and_then(|j| j.image_url.clone()),
            large_image_url: jpg.and_then(|j| j.large_image_url),
            score: self.score,
            kind: self.kind,
            year: self.year,
        }
    }
}

/// Upstream recommendation rows nest the anime under `entry`
#[derive(Debug, Deserialize)]
struct RecommendationRaw {
    entry: Option<AnimeRaw>,
}

#[derive(Debug, Deserialize)]
struct ImagesRaw {
    jpg: Option<ImageSetRaw>,
}

#[derive(Debug, Deserialize)]
struct ImageSetRaw {
    image_url: Option<String>,
    large_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailRaw {
    #[serde(flatten)]
    base: AnimeRaw,
    synopsis: Option<String>,
    episodes: Option<u32>,
    duration: Option<String>,
    trailer: Option<TrailerRaw>,
    #[serde(default)]
    genres: Vec<GenreRaw>,
    #[serde(default)]
    studios: Vec<NamedRaw>,
    #[serde(default)]
    producers: Vec<NamedRaw>,
    #[serde(default)]
    titles: Vec<TitleRaw>,
    status: Option<String>,
    season: Option<String>,
    #[serde(default)]
    streaming: Vec<LinkRaw>,
}

impl DetailRaw {
    fn into_detail(self) -> DetailRecord {
        DetailRecord {
            entry: self.base.into_entry(),
            synopsis: self.synopsis,
            episodes: self.episodes,
            duration: self.duration,
            trailer_youtube_id: self.trailer.and_then(|t| t.youtube_id),
            genres: self
                .genres
                .into_iter()
                .map(|g| Genre {
                    name: g.name,
                    mal_id: g.mal_id,
                })
                .collect(),
            studios: self.studios.into_iter().map(|s| s.name).collect(),
            producers: self.producers.into_iter().map(|p| p.name).collect(),
            titles: self.titles.into_iter().map(|t| t.title).collect(),
            status: self.status,
            season: self.season,
            streaming: self
                .streaming
                .into_iter()
                .map(|l| ExternalLink {
                    name: l.name,
                    url: l.url,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TrailerRaw {
    youtube_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenreRaw {
    name: String,
    mal_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct NamedRaw {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TitleRaw {
    title: String,
}

#[derive(Debug, Deserialize)]
struct LinkRaw {
    name: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct EpisodeRaw {
    mal_id: u64,
    title: Option<String>,
    aired: Option<String>,
    filler: Option<bool>,
    recap: Option<bool>,
    /// Some mirrors include an explicit episode number; the row id doubles
    /// as one otherwise
    episode: Option<u32>,
}

impl EpisodeRaw {
    fn into_episode(self) -> EpisodeMeta {
        EpisodeMeta {
            mal_id: self.mal_id,
            number: self.episode.unwrap_or(self.mal_id as u32),
            title: self.title.unwrap_or_default(),
            aired: self.aired,
            filler: self.filler.unwrap_or(false),
            recap: self.recap.unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EpisodePageRaw {
    #[serde(default)]
    data: Vec<EpisodeRaw>,
    pagination: Option<PaginationRaw>,
}

impl EpisodePageRaw {
    fn into_page(self) -> EpisodePage {
        let pagination = self
            .pagination
            .map(|p| Pagination {
                last_visible_page: p.last_visible_page.unwrap_or(1),
                has_next_page: p.has_next_page.unwrap_or(false),
            })
            .unwrap_or_default();
        EpisodePage {
            data: self.data.into_iter().map(EpisodeRaw::into_episode).collect(),
            pagination,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PaginationRaw {
    last_visible_page: Option<u32>,
    has_next_page: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anime_raw_defaults() {
        let raw: AnimeRaw = serde_json::from_str(r#"{"mal_id": 20}"#).unwrap();
        let entry = raw.into_entry();
        assert_eq!(entry.mal_id, 20);
        assert_eq!(entry.title, "");
        assert!(entry.image_url.is_none());
        assert!(entry.score.is_none());
    }

    #[test]
    fn test_detail_raw_flattens_entry() {
        let raw: DetailRaw = serde_json::from_str(
            r#"{
                "mal_id": 20,
                "title": "Naruto",
                "type": "tv",
                "synopsis": "A ninja story",
                "episodes": 220,
                "trailer": {"youtube_id": "abc123"},
                "genres": [{"name": "Action", "mal_id": 1}],
                "studios": [{"name": "Pierrot"}],
                "titles": [{"title": "Naruto"}, {"title": "NARUTO"}]
            }"#,
        )
        .unwrap();
        let detail = raw.into_detail();
        assert_eq!(detail.entry.mal_id, 20);
        assert_eq!(detail.entry.kind.as_deref(), Some("tv"));
        assert_eq!(detail.episodes, Some(220));
        assert_eq!(detail.trailer_youtube_id.as_deref(), Some("abc123"));
        assert_eq!(detail.genres[0].name, "Action");
        assert_eq!(detail.genres[0].mal_id, Some(1));
        assert_eq!(detail.studios, vec!["Pierrot".to_string()]);
        assert_eq!(detail.titles.len(), 2);
    }

    #[test]
    fn test_episode_number_falls_back_to_row_id() {
        let raw: EpisodeRaw =
            serde_json::from_str(r#"{"mal_id": 3, "title": "Sasuke and Sakura"}"#).unwrap();
        let ep = raw.into_episode();
        assert_eq!(ep.number, 3);
        assert!(!ep.filler);
    }
}
