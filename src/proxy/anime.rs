//! Metadata proxy routes
//!
//! Each handler forwards one Jikan query and rewraps the body as
//! `{data: ...}` (the detail route returns the record bare).

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ProxyError, ProxyState};

fn data_of(body: Value) -> Value {
    body.get("data").cloned().unwrap_or_else(|| json!([]))
}

pub async fn trending(State(st): State<ProxyState>) -> Result<Json<Value>, ProxyError> {
    let body = st
        .fetch_json(&format!("{}/top/anime?filter=airing&limit=18", st.jikan_base))
        .await
        .map_err(|_| ProxyError::msg("Failed to fetch trending"))?;
    Ok(Json(json!({ "data": data_of(body) })))
}

pub async fn popular(State(st): State<ProxyState>) -> Result<Json<Value>, ProxyError> {
    let body = st
        .fetch_json(&format!("{}/top/anime?type=tv&limit=18", st.jikan_base))
        .await
        .map_err(|_| ProxyError::msg("Failed to fetch popular"))?;
    Ok(Json(json!({ "data": data_of(body) })))
}

pub async fn latest(State(st): State<ProxyState>) -> Result<Json<Value>, ProxyError> {
    let body = st
        .fetch_json(&format!("{}/seasons/now?limit=18", st.jikan_base))
        .await
        .map_err(|_| ProxyError::msg("Failed to fetch latest"))?;
    Ok(Json(json!({ "data": data_of(body) })))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

pub async fn search(
    State(st): State<ProxyState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, ProxyError> {
    let body = st
        .fetch_json(&format!(
            "{}/anime?q={}&sfw=true&order_by=popularity&sort=desc&limit=24",
            st.jikan_base,
            urlencoding::encode(&params.q)
        ))
        .await
        .map_err(|_| ProxyError::msg("Failed to search"))?;
    Ok(Json(json!({ "data": data_of(body) })))
}

pub async fn info(
    State(st): State<ProxyState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ProxyError> {
    let body = st
        .fetch_json(&format!("{}/anime/{}/full", st.jikan_base, id))
        .await
        .map_err(|_| ProxyError::msg("Failed to fetch info"))?;
    // The detail record goes out bare, not `{data: ...}`-wrapped
    Ok(Json(body.get("data").cloned().unwrap_or_else(|| json!({}))))
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    page: u32,
}

fn default_page() -> u32 {
    1
}

pub async fn episodes(
    State(st): State<ProxyState>,
    Path(id): Path<u64>,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, ProxyError> {
    let body = st
        .fetch_json(&format!(
            "{}/anime/{}/episodes?page={}",
            st.jikan_base, id, params.page
        ))
        .await
        .map_err(|_| ProxyError::msg("Failed to fetch episodes"))?;
    let pagination = body.get("pagination").cloned().unwrap_or_else(|| json!({}));
    Ok(Json(
        json!({ "data": data_of(body), "pagination": pagination }),
    ))
}

pub async fn recommendations(
    State(st): State<ProxyState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ProxyError> {
    let body = st
        .fetch_json(&format!("{}/anime/{}/recommendations", st.jikan_base, id))
        .await
        .map_err(|_| ProxyError::msg("Failed to fetch recommendations"))?;
    // Upstream rows nest the entry; unwrap them for the client
    let entries: Vec<Value> = body
        .get("data")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|r| r.get("entry").cloned())
                .collect()
        })
        .unwrap_or_default();
    Ok(Json(json!({ "data": entries })))
}

#[derive(Debug, Deserialize)]
pub struct GenreParams {
    #[serde(default)]
    ids: String,
    #[serde(default = "default_limit")]
    limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct TypeParams {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    18
}

pub async fn by_genre(
    State(st): State<ProxyState>,
    Query(params): Query<GenreParams>,
) -> Result<Json<Value>, ProxyError> {
    let body = st
        .fetch_json(&format!(
            "{}/anime?genres={}&order_by=popularity&sort=desc&limit={}",
            st.jikan_base,
            urlencoding::encode(&params.ids),
            params.limit
        ))
        .await
        .map_err(|_| ProxyError::msg("Failed to fetch by genre"))?;
    Ok(Json(json!({ "data": data_of(body) })))
}

pub async fn by_type(
    State(st): State<ProxyState>,
    Query(params): Query<TypeParams>,
) -> Result<Json<Value>, ProxyError> {
    let body = st
        .fetch_json(&format!(
            "{}/anime?type={}&order_by=popularity&sort=desc&limit={}",
            st.jikan_base,
            urlencoding::encode(&params.kind),
            params.limit
        ))
        .await
        .map_err(|_| ProxyError::msg("Failed to fetch by type"))?;
    Ok(Json(json!({ "data": data_of(body) })))
}
