//! Streaming proxy routes
//!
//! Consumet bodies pass through verbatim; only an empty search query is
//! short-circuited locally to `{results: []}`.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ProxyError, ProxyState};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Deserialize)]
pub struct InfoParams {
    #[serde(default = "default_provider")]
    provider: String,
}

#[derive(Debug, Deserialize)]
pub struct WatchParams {
    #[serde(default = "default_server")]
    server: String,
    #[serde(default = "default_provider")]
    provider: String,
}

fn default_provider() -> String {
    "gogoanime".to_string()
}

fn default_server() -> String {
    "gogocdn".to_string()
}

async fn passthrough(st: &ProxyState, url: &str) -> Result<Json<Value>, ProxyError> {
    st.fetch_json(url)
        .await
        .map(Json)
        .map_err(|_| ProxyError::msg("Upstream error"))
}

pub async fn search(
    State(st): State<ProxyState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, ProxyError> {
    let q = params.q.trim();
    if q.is_empty() {
        return Ok(Json(json!({ "results": [] })));
    }
    passthrough(
        &st,
        &format!("{}/meta/anilist/{}", st.consumet_base, urlencoding::encode(q)),
    )
    .await
}

pub async fn info(
    State(st): State<ProxyState>,
    Path(id): Path<String>,
    Query(params): Query<InfoParams>,
) -> Result<Json<Value>, ProxyError> {
    passthrough(
        &st,
        &format!(
            "{}/meta/anilist/info/{}?provider={}",
            st.consumet_base,
            urlencoding::encode(&id),
            urlencoding::encode(&params.provider)
        ),
    )
    .await
}

pub async fn watch(
    State(st): State<ProxyState>,
    Path(episode_id): Path<String>,
    Query(params): Query<WatchParams>,
) -> Result<Json<Value>, ProxyError> {
    passthrough(
        &st,
        &format!(
            "{}/meta/anilist/watch/{}?server={}&provider={}",
            st.consumet_base,
            urlencoding::encode(&episode_id),
            urlencoding::encode(&params.server),
            urlencoding::encode(&params.provider)
        ),
    )
    .await
}

pub async fn gogo_search(
    State(st): State<ProxyState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, ProxyError> {
    let q = params.q.trim();
    if q.is_empty() {
        return Ok(Json(json!({ "results": [] })));
    }
    passthrough(
        &st,
        &format!(
            "{}/anime/gogoanime/{}",
            st.consumet_base,
            urlencoding::encode(q)
        ),
    )
    .await
}

pub async fn gogo_info(
    State(st): State<ProxyState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ProxyError> {
    passthrough(
        &st,
        &format!(
            "{}/anime/gogoanime/info/{}",
            st.consumet_base,
            urlencoding::encode(&id)
        ),
    )
    .await
}

pub async fn gogo_watch(
    State(st): State<ProxyState>,
    Path(episode_id): Path<String>,
    Query(params): Query<WatchParams>,
) -> Result<Json<Value>, ProxyError> {
    passthrough(
        &st,
        &format!(
            "{}/anime/gogoanime/watch?episodeId={}&server={}",
            st.consumet_base,
            urlencoding::encode(&episode_id),
            urlencoding::encode(&params.server)
        ),
    )
    .await
}
