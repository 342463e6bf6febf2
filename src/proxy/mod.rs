//! Thin proxy server
//!
//! Forwards each metadata/streaming query to exactly one upstream URL and
//! reshapes the JSON envelope (`{data: ...}` for metadata routes, verbatim
//! passthrough for streaming routes). On upstream failure: HTTP 500 with a
//! static `{error: string}` body. No retry, no backoff, no auth.

pub mod anime;
pub mod stream;

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::consumet::CONSUMET_URL;
use crate::api::jikan::JIKAN_URL;

/// Shared handler state: one HTTP client plus the upstream bases
#[derive(Clone)]
pub struct ProxyState {
    client: reqwest::Client,
    pub jikan_base: String,
    pub consumet_base: String,
}

impl ProxyState {
    /// State pointing at the default upstreams
    pub fn new() -> Self {
        Self::with_bases(JIKAN_URL, CONSUMET_URL)
    }

    /// State with explicit upstream bases (also for testing)
    pub fn with_bases(jikan_base: impl Into<String>, consumet_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("anitui")
                .build()
                .unwrap_or_default(),
            jikan_base: jikan_base.into().trim_end_matches('/').to_string(),
            consumet_base: consumet_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// One upstream GET, parsed as loose JSON
    pub(crate) async fn fetch_json(&self, url: &str) -> Result<Value, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        response.json().await
    }
}

impl Default for ProxyState {
    fn default() -> Self {
        Self::new()
    }
}

/// Handler error: always a 500 with a static message
#[derive(Debug)]
pub struct ProxyError(&'static str);

impl ProxyError {
    pub fn msg(message: &'static str) -> Self {
        Self(message)
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        tracing::warn!(error = self.0, "upstream request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0 })),
        )
            .into_response()
    }
}

async fn ping() -> Json<Value> {
    Json(json!({ "message": "ping" }))
}

/// Build the full route table
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/api/ping", get(ping))
        // Metadata routes
        .route("/api/anime/trending", get(anime::trending))
        .route("/api/anime/popular", get(anime::popular))
        .route("/api/anime/latest", get(anime::latest))
        .route("/api/anime/search", get(anime::search))
        .route("/api/anime/info/{id}", get(anime::info))
        .route("/api/anime/episodes/{id}", get(anime::episodes))
        .route("/api/anime/recommendations/{id}", get(anime::recommendations))
        .route("/api/anime/genre", get(anime::by_genre))
        .route("/api/anime/type", get(anime::by_type))
        // Streaming routes (primary provider)
        .route("/api/stream/search", get(stream::search))
        .route("/api/stream/info/{id}", get(stream::info))
        .route("/api/stream/watch/{episode_id}", get(stream::watch))
        // Streaming routes (secondary provider)
        .route("/api/gogo/search", get(stream::gogo_search))
        .route("/api/gogo/info/{id}", get(stream::gogo_info))
        .route("/api/gogo/watch/{episode_id}", get(stream::gogo_watch))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until shutdown
pub async fn serve(addr: SocketAddr, state: ProxyState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "proxy listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
