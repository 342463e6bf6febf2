//! Jikan metadata client tests
//!
//! Covers list parsing, the detail envelope asymmetry, the proxy-first
//! resolution order, and recommendation row unwrapping.

use mockito::{Matcher, Server};
use anitui::api::jikan::JikanError;
use anitui::api::JikanClient;

// =============================================================================
// List Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_trending_parses_entries() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "data": [
            {
                "mal_id": 16498,
                "title": "Shingeki no Kyojin",
                "title_english": "Attack on Titan",
                "images": {
                    "jpg": {
                        "image_url": "https://cdn.example/16498.jpg",
                        "large_image_url": "https://cdn.example/16498l.jpg"
                    }
                },
                "score": 8.55,
                "type": "TV",
                "year": 2013
            },
            {
                "mal_id": 52991,
                "title": "Sousou no Frieren",
                "score": 9.3,
                "type": "TV"
            }
        ]
    }"#;

    let mock = server
        .mock("GET", "/top/anime")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("filter".into(), "airing".into()),
            Matcher::UrlEncoded("limit".into(), "18".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(mock_response)
        .create_async()
        .await;

    let client = JikanClient::with_bases(None, server.url());
    let entries = client.trending().await.unwrap();

    mock.assert_async().await;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].mal_id, 16498);
    assert_eq!(entries[0].title, "Shingeki no Kyojin");
    assert_eq!(entries[0].title_english.as_deref(), Some("Attack on Titan"));
    assert_eq!(
        entries[0].image_url.as_deref(),
        Some("https://cdn.example/16498.jpg")
    );
    assert_eq!(entries[0].score, Some(8.55));
    assert_eq!(entries[0].year, Some(2013));

    // Sparse row: optional fields default cleanly
    assert_eq!(entries[1].mal_id, 52991);
    assert!(entries[1].title_english.is_none());
    assert!(entries[1].image_url.is_none());
    assert!(entries[1].year.is_none());
}

#[tokio::test]
async fn test_search_encodes_query() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/anime")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "attack on titan".into()),
            Matcher::UrlEncoded("sfw".into(), "true".into()),
            Matcher::UrlEncoded("order_by".into(), "popularity".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"data": [{"mal_id": 16498, "title": "Shingeki no Kyojin"}]}"#)
        .create_async()
        .await;

    let client = JikanClient::with_bases(None, server.url());
    let entries = client.search("attack on titan").await.unwrap();

    mock.assert_async().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].mal_id, 16498);
}

// =============================================================================
// Browse Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_by_genre_forwards_ids_and_limit() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/anime")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("genres".into(), "1,4".into()),
            Matcher::UrlEncoded("order_by".into(), "popularity".into()),
            Matcher::UrlEncoded("sort".into(), "desc".into()),
            Matcher::UrlEncoded("limit".into(), "12".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"data": [{"mal_id": 5114, "title": "Fullmetal Alchemist: Brotherhood"}]}"#)
        .create_async()
        .await;

    let client = JikanClient::with_bases(None, server.url());
    let entries = client.by_genre("1,4", 12).await.unwrap();

    mock.assert_async().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].mal_id, 5114);
}

#[tokio::test]
async fn test_by_type_forwards_kind_and_limit() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/anime")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("type".into(), "movie".into()),
            Matcher::UrlEncoded("order_by".into(), "popularity".into()),
            Matcher::UrlEncoded("limit".into(), "6".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"data": [{"mal_id": 32281, "title": "Kimi no Na wa."}]}"#)
        .create_async()
        .await;

    let client = JikanClient::with_bases(None, server.url());
    let entries = client.by_type("movie", 6).await.unwrap();

    mock.assert_async().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Kimi no Na wa.");
}

// =============================================================================
// Detail Envelope Tests
// =============================================================================

#[tokio::test]
async fn test_info_direct_unwraps_data_envelope() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "data": {
            "mal_id": 20,
            "title": "Naruto",
            "title_english": "Naruto",
            "synopsis": "A ninja story",
            "episodes": 220,
            "duration": "23 min per ep",
            "trailer": {"youtube_id": "abc123"},
            "genres": [{"mal_id": 1, "name": "Action"}],
            "studios": [{"name": "Pierrot"}],
            "status": "Finished Airing",
            "season": "fall",
            "streaming": [{"name": "Crunchyroll", "url": "https://cr.example"}]
        }
    }"#;

    let mock = server
        .mock("GET", "/anime/20/full")
        .with_status(200)
        .with_body(mock_response)
        .create_async()
        .await;

    let client = JikanClient::with_bases(None, server.url());
    let detail = client.info(20).await.unwrap();

    mock.assert_async().await;

    assert_eq!(detail.entry.mal_id, 20);
    assert_eq!(detail.synopsis.as_deref(), Some("A ninja story"));
    assert_eq!(detail.episodes, Some(220));
    assert_eq!(detail.trailer_youtube_id.as_deref(), Some("abc123"));
    assert_eq!(detail.genres.len(), 1);
    assert_eq!(detail.genres[0].name, "Action");
    assert_eq!(detail.studios, vec!["Pierrot".to_string()]);
    assert_eq!(detail.streaming.len(), 1);
    assert_eq!(detail.search_title(), "Naruto");
}

#[tokio::test]
async fn test_info_proxy_returns_bare_record() {
    let mut proxy = Server::new_async().await;

    // The proxy route serves the detail record without a {data: ...} wrapper
    let mock = proxy
        .mock("GET", "/api/anime/info/20")
        .with_status(200)
        .with_body(r#"{"mal_id": 20, "title": "Naruto", "episodes": 220}"#)
        .create_async()
        .await;

    let client = JikanClient::with_bases(Some(proxy.url()), "http://unused.invalid");
    let detail = client.info(20).await.unwrap();

    mock.assert_async().await;
    assert_eq!(detail.entry.mal_id, 20);
    assert_eq!(detail.episodes, Some(220));
}

// =============================================================================
// Resolution Order Tests
// =============================================================================

#[tokio::test]
async fn test_proxy_tried_before_upstream() {
    let mut proxy = Server::new_async().await;
    let mut direct = Server::new_async().await;

    let proxy_mock = proxy
        .mock("GET", "/api/anime/trending")
        .with_status(200)
        .with_body(r#"{"data": [{"mal_id": 1, "title": "From Proxy"}]}"#)
        .create_async()
        .await;

    let direct_mock = direct
        .mock("GET", "/top/anime")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = JikanClient::with_bases(Some(proxy.url()), direct.url());
    let entries = client.trending().await.unwrap();

    proxy_mock.assert_async().await;
    direct_mock.assert_async().await;
    assert_eq!(entries[0].title, "From Proxy");
}

#[tokio::test]
async fn test_proxy_failure_falls_back_to_upstream() {
    let mut proxy = Server::new_async().await;
    let mut direct = Server::new_async().await;

    proxy
        .mock("GET", "/api/anime/trending")
        .with_status(500)
        .create_async()
        .await;

    direct
        .mock("GET", "/top/anime")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"data": [{"mal_id": 2, "title": "From Upstream"}]}"#)
        .create_async()
        .await;

    let client = JikanClient::with_bases(Some(proxy.url()), direct.url());
    let entries = client.trending().await.unwrap();

    assert_eq!(entries[0].title, "From Upstream");
}

#[tokio::test]
async fn test_error_only_when_both_attempts_fail() {
    let mut proxy = Server::new_async().await;
    let mut direct = Server::new_async().await;

    proxy
        .mock("GET", "/api/anime/trending")
        .with_status(502)
        .create_async()
        .await;

    direct
        .mock("GET", "/top/anime")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let client = JikanClient::with_bases(Some(proxy.url()), direct.url());
    let err = client.trending().await.unwrap_err();

    // The surfaced error comes from the final (upstream) attempt
    match err {
        JikanError::Status(code) => assert_eq!(code, 404),
        other => panic!("Expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_json_is_a_parse_error() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/top/anime")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("not json at all")
        .create_async()
        .await;

    let client = JikanClient::with_bases(None, server.url());
    match client.trending().await.unwrap_err() {
        JikanError::InvalidResponse(_) => {}
        other => panic!("Expected invalid response, got {:?}", other),
    }
}

// =============================================================================
// Recommendation Tests
// =============================================================================

#[tokio::test]
async fn test_recommendations_unwrap_nested_entries() {
    let mut server = Server::new_async().await;

    // Upstream rows nest the anime under "entry"; rows without one are dropped
    let mock_response = r#"{
        "data": [
            {"entry": {"mal_id": 1735, "title": "Naruto: Shippuuden"}},
            {"votes": 3},
            {"entry": {"mal_id": 21, "title": "One Piece"}}
        ]
    }"#;

    let mock = server
        .mock("GET", "/anime/20/recommendations")
        .with_status(200)
        .with_body(mock_response)
        .create_async()
        .await;

    let client = JikanClient::with_bases(None, server.url());
    let recs = client.recommendations(20).await.unwrap();

    mock.assert_async().await;
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].mal_id, 1735);
    assert_eq!(recs[1].title, "One Piece");
}

#[tokio::test]
async fn test_recommendations_proxy_rows_arrive_flat() {
    let mut proxy = Server::new_async().await;

    // The proxy pre-unwraps, so rows are plain catalog entries
    let mock = proxy
        .mock("GET", "/api/anime/recommendations/20")
        .with_status(200)
        .with_body(r#"{"data": [{"mal_id": 1735, "title": "Naruto: Shippuuden"}]}"#)
        .create_async()
        .await;

    let client = JikanClient::with_bases(Some(proxy.url()), "http://unused.invalid");
    let recs = client.recommendations(20).await.unwrap();

    mock.assert_async().await;
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].mal_id, 1735);
}

// =============================================================================
// Episode Page Tests
// =============================================================================

#[tokio::test]
async fn test_episodes_page_carries_pagination() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "data": [
            {"mal_id": 1, "title": "Enter: Naruto Uzumaki!", "filler": false},
            {"mal_id": 2, "title": "My Name is Konohamaru!", "filler": true}
        ],
        "pagination": {"has_next_page": true, "last_visible_page": 5}
    }"#;

    let mock = server
        .mock("GET", "/anime/20/episodes")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(200)
        .with_body(mock_response)
        .create_async()
        .await;

    let client = JikanClient::with_bases(None, server.url());
    let page = client.episodes(20, 2).await.unwrap();

    mock.assert_async().await;
    assert_eq!(page.data.len(), 2);
    assert!(page.data[1].filler);
    assert!(page.pagination.has_next_page);
    assert_eq!(page.pagination.last_visible_page, 5);
}
