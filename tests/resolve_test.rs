//! Stream reconciliation tests
//!
//! Drives the full resolver pipeline against mocked upstreams: candidate
//! selection, the secondary-provider fallbacks, and source picking.

use mockito::{Matcher, Server};
use anitui::api::ConsumetClient;
use anitui::models::{AudioVariant, MirrorServer};
use anitui::resolve::{StreamProvider, StreamResolver};

fn resolver_for(server: &Server) -> StreamResolver {
    StreamResolver::new(ConsumetClient::with_bases(None, server.url()))
}

// =============================================================================
// Episode Pipeline Tests
// =============================================================================

#[tokio::test]
async fn test_mal_cross_reference_beats_rank_order() {
    let mut server = Server::new_async().await;

    // First-ranked hit has the wrong MAL id; the second matches
    server
        .mock("GET", "/meta/anilist/Naruto")
        .with_status(200)
        .with_body(
            r#"{"results": [
                {"id": "wrong", "malId": 99},
                {"id": "right", "malId": 20}
            ]}"#,
        )
        .create_async()
        .await;

    let episodes_mock = server
        .mock("GET", "/meta/anilist/info/right")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"episodes": [{"id": "naruto-episode-1", "number": 1}]}"#)
        .create_async()
        .await;

    let mut resolver = resolver_for(&server);
    let set = resolver.episodes_for("Naruto", 20).await;

    episodes_mock.assert_async().await;
    assert_eq!(set.provider, Some(StreamProvider::Anilist));
    assert_eq!(set.episodes.len(), 1);
    assert_eq!(set.episodes[0].id, "naruto-episode-1");
}

#[tokio::test]
async fn test_no_match_takes_first_ranked_hit() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/meta/anilist/Naruto")
        .with_status(200)
        .with_body(r#"{"results": [{"id": "first"}, {"id": "second"}]}"#)
        .create_async()
        .await;

    let episodes_mock = server
        .mock("GET", "/meta/anilist/info/first")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"episodes": [{"id": "ep-1", "number": 1}]}"#)
        .create_async()
        .await;

    let mut resolver = resolver_for(&server);
    let set = resolver.episodes_for("Naruto", 20).await;

    episodes_mock.assert_async().await;
    assert_eq!(set.episodes.len(), 1);
}

#[tokio::test]
async fn test_empty_primary_episodes_fall_back_to_gogo() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/meta/anilist/Naruto")
        .with_status(200)
        .with_body(r#"{"results": [{"id": "20", "malId": 20}]}"#)
        .create_async()
        .await;

    // Primary candidate exists but with zero episodes
    server
        .mock("GET", "/meta/anilist/info/20")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"episodes": []}"#)
        .create_async()
        .await;

    server
        .mock("GET", "/anime/gogoanime/Naruto")
        .with_status(200)
        .with_body(r#"{"results": [{"id": "naruto"}]}"#)
        .create_async()
        .await;

    server
        .mock("GET", "/anime/gogoanime/info/naruto")
        .with_status(200)
        .with_body(
            r#"{"episodes": [
                {"id": "naruto-episode-1", "episode": 1},
                {"id": "naruto-dub-episode-1", "episode": 1}
            ]}"#,
        )
        .create_async()
        .await;

    let mut resolver = resolver_for(&server);
    let set = resolver.episodes_for("Naruto", 20).await;

    assert_eq!(set.provider, Some(StreamProvider::Gogo));
    assert_eq!(set.episodes.len(), 2);
    assert!(set.has_dub);
}

#[tokio::test]
async fn test_zero_hits_short_circuits_to_empty() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/meta/anilist/Nonexistent")
        .with_status(200)
        .with_body(r#"{"results": []}"#)
        .create_async()
        .await;

    // The secondary provider must not be consulted when search had no hits
    let gogo_mock = server
        .mock("GET", "/anime/gogoanime/Nonexistent")
        .expect(0)
        .create_async()
        .await;

    let mut resolver = resolver_for(&server);
    let set = resolver.episodes_for("Nonexistent", 1).await;

    gogo_mock.assert_async().await;
    assert!(set.is_empty());
    assert!(set.provider.is_none());
}

#[tokio::test]
async fn test_search_error_degrades_to_empty() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/meta/anilist/Naruto")
        .with_status(500)
        .create_async()
        .await;

    let mut resolver = resolver_for(&server);
    let set = resolver.episodes_for("Naruto", 20).await;

    assert!(set.is_empty());
}

#[tokio::test]
async fn test_dub_availability_memoized() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/meta/anilist/Naruto")
        .with_status(200)
        .with_body(r#"{"results": [{"id": "20", "malId": 20}]}"#)
        .create_async()
        .await;

    server
        .mock("GET", "/meta/anilist/info/20")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"episodes": [
                {"id": "naruto-episode-1", "number": 1},
                {"id": "naruto-dub-episode-1", "number": 1, "isDub": true}
            ]}"#,
        )
        .create_async()
        .await;

    let mut resolver = resolver_for(&server);
    assert_eq!(resolver.dub_hint("Naruto"), None);

    let set = resolver.episodes_for("Naruto", 20).await;
    assert!(set.has_dub);
    assert_eq!(resolver.dub_hint("Naruto"), Some(true));
}

#[tokio::test]
async fn test_variant_filtering_over_resolved_set() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/meta/anilist/Naruto")
        .with_status(200)
        .with_body(r#"{"results": [{"id": "20", "malId": 20}]}"#)
        .create_async()
        .await;

    server
        .mock("GET", "/meta/anilist/info/20")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"episodes": [
                {"id": "naruto-episode-1", "number": 1},
                {"id": "naruto-episode-2", "number": 2},
                {"id": "naruto-dub-episode-1", "number": 1, "isDub": true}
            ]}"#,
        )
        .create_async()
        .await;

    let mut resolver = resolver_for(&server);
    let set = resolver.episodes_for("Naruto", 20).await;

    let subs = set.filtered(AudioVariant::Sub);
    assert_eq!(subs.len(), 2);
    assert!(subs.iter().all(|e| !e.is_dub));

    let dubs = set.filtered(AudioVariant::Dub);
    assert_eq!(dubs.len(), 1);
    assert_eq!(dubs[0].number, 1);
}

// =============================================================================
// Source Pipeline Tests
// =============================================================================

#[tokio::test]
async fn test_adaptive_manifest_preferred() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/meta/anilist/watch/naruto-episode-1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"sources": [
                {"url": "https://cdn.example/720.mp4", "quality": "720p"},
                {"url": "https://cdn.example/master.m3u8", "quality": "default"}
            ]}"#,
        )
        .create_async()
        .await;

    let resolver = resolver_for(&server);
    let resolved = resolver
        .sources_for("naruto-episode-1", MirrorServer::GogoCdn)
        .await;

    let source = resolved.source.unwrap();
    assert!(source.is_adaptive());
    assert_eq!(source.url, "https://cdn.example/master.m3u8");
}

#[tokio::test]
async fn test_first_source_when_none_adaptive() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/meta/anilist/watch/naruto-episode-1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"sources": [
                {"url": "https://cdn.example/a.mp4", "quality": "480p"},
                {"url": "https://cdn.example/b.mp4", "quality": "720p"}
            ]}"#,
        )
        .create_async()
        .await;

    let resolver = resolver_for(&server);
    let resolved = resolver
        .sources_for("naruto-episode-1", MirrorServer::GogoCdn)
        .await;

    assert_eq!(resolved.source.unwrap().url, "https://cdn.example/a.mp4");
}

#[tokio::test]
async fn test_empty_primary_sources_retry_on_gogo() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/meta/anilist/watch/naruto-episode-1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"sources": []}"#)
        .create_async()
        .await;

    // Same episode id and server against the secondary provider
    let gogo_mock = server
        .mock("GET", "/anime/gogoanime/watch")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("episodeId".into(), "naruto-episode-1".into()),
            Matcher::UrlEncoded("server".into(), "vidstreaming".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{
                "sources": [{"url": "https://cdn.example/g.m3u8", "quality": "1080p"}],
                "subtitles": [{"url": "https://cdn.example/en.vtt", "lang": "English"}]
            }"#,
        )
        .create_async()
        .await;

    let resolver = resolver_for(&server);
    let resolved = resolver
        .sources_for("naruto-episode-1", MirrorServer::Vidstreaming)
        .await;

    gogo_mock.assert_async().await;
    assert_eq!(resolved.source.unwrap().url, "https://cdn.example/g.m3u8");
    assert_eq!(resolved.subtitles.len(), 1);
}

#[tokio::test]
async fn test_exhausted_fallbacks_resolve_to_none() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/meta/anilist/watch/naruto-episode-1")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    server
        .mock("GET", "/anime/gogoanime/watch")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let resolver = resolver_for(&server);
    let resolved = resolver
        .sources_for("naruto-episode-1", MirrorServer::GogoCdn)
        .await;

    // Degrades to "unavailable", never an error
    assert!(resolved.source.is_none());
    assert!(resolved.subtitles.is_empty());
}
