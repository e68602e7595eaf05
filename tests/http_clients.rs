//! Integration tests for the stations, release and cover clients
#![cfg(not(target_arch = "wasm32"))]

use musico::api::{CoverResolver, JangoClient, Release, ReleaseLoader, StationSource};
use musico::cache::{keys, ExpiringCache};
use musico::db::{KeyValueStore, MemoryStore};
use musico::Error;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RELEASE_ID: &str = "b84ee12a-09ef-421b-82de-0441a926375b";

fn mock_release_json() -> serde_json::Value {
    json!({
        "id": RELEASE_ID,
        "title": "Kind of Blue",
        "date": "1959-08-17",
        "country": "US",
        "artist-credit": [{ "name": "Miles Davis", "artist": { "name": "Miles Davis" } }],
        "label-info": [{ "label": { "name": "Columbia" } }],
        "tags": [{ "name": "jazz", "count": 4 }],
        "genres": [{ "name": "jazz", "count": 4 }],
        "rating": { "value": 4.9, "votes-count": 20 },
        "media": [{ "tracks": [{ "number": "1", "title": "So What", "length": 545000 }] }]
    })
}

fn resolver(server: &MockServer, cache: ExpiringCache<MemoryStore>) -> CoverResolver<MemoryStore> {
    CoverResolver::new(cache)
        .with_archive_url(server.uri())
        .with_route_url(format!("{}/api/cover", server.uri()))
        .with_timeouts(Duration::from_millis(300), Duration::from_millis(300))
}

#[tokio::test]
async fn test_cover_primary_hit_skips_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/release/{RELEASE_ID}/front")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8]))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/api/cover/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let covers = resolver(&mock_server, ExpiringCache::new(MemoryStore::new()));
    let url = covers.resolve(RELEASE_ID, "Miles Davis", "Kind of Blue").await;

    assert_eq!(
        url,
        Some(format!("{}/release/{RELEASE_ID}/front", mock_server.uri()))
    );
}

#[tokio::test]
async fn test_cover_fallback_queried_exactly_once_after_primary_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/release/{RELEASE_ID}/front")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/api/cover/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "coverUrl": "https://is1-ssl.mzstatic.com/kob.jpg" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let cache = ExpiringCache::new(MemoryStore::new());
    let covers = resolver(&mock_server, cache.clone());

    let first = covers.resolve(RELEASE_ID, "Miles Davis", "Kind of Blue").await;
    assert_eq!(first.as_deref(), Some("https://is1-ssl.mzstatic.com/kob.jpg"));

    // Served from the cache: neither endpoint is hit again.
    let second = covers.resolve(RELEASE_ID, "Miles Davis", "Kind of Blue").await;
    assert_eq!(second, first);
    assert_eq!(
        cache.get::<String>(&keys::cover(RELEASE_ID)).as_deref(),
        Some("https://is1-ssl.mzstatic.com/kob.jpg")
    );
}

#[tokio::test]
async fn test_cover_primary_timeout_falls_back() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/release/{RELEASE_ID}/front")))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/api/cover/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "coverUrl": "https://img/fallback.jpg" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let covers = resolver(&mock_server, ExpiringCache::new(MemoryStore::new()));
    let url = covers.resolve(RELEASE_ID, "Miles Davis", "Kind of Blue").await;

    assert_eq!(url.as_deref(), Some("https://img/fallback.jpg"));
}

#[tokio::test]
async fn test_cover_both_sources_failing_resolves_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/release/{RELEASE_ID}/front")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/api/cover/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "No cover found" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cache = ExpiringCache::new(MemoryStore::new());
    let covers = resolver(&mock_server, cache.clone());

    assert_eq!(covers.resolve(RELEASE_ID, "Nobody", "Nothing").await, None);
    assert!(cache.store().is_empty());
}

#[tokio::test]
async fn test_cover_for_release_uses_credits_and_title() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/release/{RELEASE_ID}/front")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/api/cover/Miles%20Davis/Kind%20of%20Blue$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "coverUrl": "https://img/kob.jpg" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let release: Release = serde_json::from_value(mock_release_json()).unwrap();
    let covers = resolver(&mock_server, ExpiringCache::new(MemoryStore::new()));

    assert_eq!(
        covers.resolve_release(&release).await.as_deref(),
        Some("https://img/kob.jpg")
    );
}

#[tokio::test]
async fn test_release_is_fetched_once_then_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/ws/2/release/{RELEASE_ID}")))
        .and(query_param("fmt", "json"))
        .and(header("user-agent", "MusicoTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_release_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cache = ExpiringCache::new(MemoryStore::new());
    let loader = ReleaseLoader::new(cache.clone())
        .with_base_url(format!("{}/ws/2", mock_server.uri()))
        .with_user_agent("MusicoTest/1.0");

    let first = loader.load_release(RELEASE_ID).await.unwrap();
    assert_eq!(first.title, "Kind of Blue");
    assert_eq!(first.artist_display(), "Miles Davis");
    assert_eq!(first.label_names(), vec!["Columbia"]);

    let second = loader.load_release(RELEASE_ID).await.unwrap();
    assert_eq!(second, first);

    let raw = cache
        .store()
        .get_item(&keys::release(RELEASE_ID))
        .unwrap()
        .unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored["data"]["title"], "Kind of Blue");
    assert!(stored["expiry"].is_i64());
}

#[tokio::test]
async fn test_release_error_status_is_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex("^/release/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Not Found" })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let cache = ExpiringCache::new(MemoryStore::new());
    let loader = ReleaseLoader::new(cache.clone()).with_base_url(mock_server.uri());

    assert!(matches!(
        loader.load_release("missing").await,
        Err(Error::Status(404))
    ));
    assert!(loader.load_release("missing").await.is_err());
    assert!(cache.store().is_empty());
}

#[tokio::test]
async fn test_release_timeout_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex("^/release/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(mock_release_json())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let loader = ReleaseLoader::new(ExpiringCache::new(MemoryStore::new()))
        .with_base_url(mock_server.uri())
        .with_timeout(Duration::from_millis(100));

    let err = loader.load_release(RELEASE_ID).await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_stations_and_songs() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "stations": [{ "id": 1, "name": "Classic Rock" }, { "id": 2, "name": "Jazz" }]
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stations/1/songs"))
        .and(query_param("count", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "songs": [
                {
                    "album": "Rumours",
                    "artist": "Fleetwood Mac",
                    "album_art": "https://img/rumours.jpg",
                    "station": "Classic Rock",
                    "song": "Dreams",
                    "url": "https://stream/dreams.mp3"
                }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = JangoClient::new(mock_server.uri());

    let stations = client.stations().await.unwrap();
    assert_eq!(stations.len(), 2);
    assert_eq!(stations[0].name, "Classic Rock");

    let songs = client.songs(1, 100).await.unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].title, "Dreams");
    assert_eq!(songs[0].stream_url, "https://stream/dreams.mp3");
}

#[tokio::test]
async fn test_unsuccessful_payload_and_http_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stations/9/songs"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let client = JangoClient::new(mock_server.uri());

    assert!(matches!(client.stations().await, Err(Error::Api(_))));
    assert!(matches!(client.songs(9, 10).await, Err(Error::Status(502))));
}
