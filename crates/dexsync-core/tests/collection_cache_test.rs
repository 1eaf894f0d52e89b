#![allow(clippy::unwrap_used)]
// Integration tests for `CollectionCache` against a mocked catalog.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dexsync_api::{CatalogClient, RetryPolicy, TransportConfig};
use dexsync_core::{CollectionCache, CollectionCursor};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(page_size: u32) -> (MockServer, CollectionCache) {
    let server = MockServer::start().await;
    let client = CatalogClient::new(&server.uri(), &TransportConfig::default())
        .unwrap()
        .with_retry(RetryPolicy::NONE);
    (server, CollectionCache::new(client, page_size))
}

fn page_body(base: &str, ids: std::ops::Range<u32>, has_next: bool) -> serde_json::Value {
    let results: Vec<_> = ids
        .map(|id| json!({"name": format!("mon-{id}"), "url": format!("{base}/pokemon/{id}/")}))
        .collect();
    json!({
        "count": 25,
        "next": if has_next { json!(format!("{base}/pokemon?offset=20&limit=20")) } else { json!(null) },
        "previous": null,
        "results": results,
    })
}

fn detail_body(id: u32) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("mon-{id}"),
        "types": [{"slot": 1, "type": {"name": "water"}}],
        "abilities": [{"slot": 1, "is_hidden": false, "ability": {"name": "torrent"}}],
        "sprites": {"front_default": format!("https://img/{id}.png")}
    })
}

async fn mount_page(server: &MockServer, offset: usize, ids: std::ops::Range<u32>, has_next: bool) {
    Mock::given(method("GET"))
        .and(path("/pokemon"))
        .and(query_param("offset", offset.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            &server.uri(),
            ids,
            has_next,
        )))
        .mount(server)
        .await;
}

// ── Paging ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_pages_through_twenty_five_items() {
    let (server, cache) = setup(20).await;
    mount_page(&server, 0, 1..21, true).await;
    mount_page(&server, 20, 21..26, false).await;

    assert_eq!(cache.cursor(), CollectionCursor { offset: 0, has_more: true });

    cache.refresh().await;
    assert_eq!(cache.len(), 20);
    assert_eq!(cache.cursor(), CollectionCursor { offset: 20, has_more: true });

    cache.load_more().await;
    assert_eq!(cache.len(), 25);
    assert_eq!(cache.cursor(), CollectionCursor { offset: 25, has_more: false });

    let ids: Vec<u32> = cache.items().iter().map(|i| i.id).collect();
    assert_eq!(ids, (1..26).collect::<Vec<_>>());

    // Exhausted: no further request.
    cache.load_more().await;
    assert_eq!(cache.len(), 25);
    let list_calls = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/pokemon")
        .count();
    assert_eq!(list_calls, 2);
}

#[tokio::test]
async fn test_refresh_replaces_items_and_resets_cursor() {
    let (server, cache) = setup(20).await;
    mount_page(&server, 0, 1..21, true).await;
    mount_page(&server, 20, 21..26, false).await;

    cache.refresh().await;
    cache.load_more().await;
    cache.refresh().await;

    assert_eq!(cache.len(), 20);
    assert_eq!(cache.cursor(), CollectionCursor { offset: 20, has_more: true });
}

#[tokio::test]
async fn test_refresh_failure_keeps_items_and_records_error() {
    let (server, cache) = setup(20).await;
    Mock::given(method("GET"))
        .and(path("/pokemon"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&server.uri(), 1..4, false)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pokemon"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    cache.refresh().await;
    assert_eq!(cache.len(), 3);
    assert!(cache.last_error().is_none());

    cache.refresh().await;
    assert_eq!(cache.len(), 3);
    let error = cache.last_error().unwrap();
    assert!(error.starts_with("Failed to load catalog: "), "{error}");

    cache.clear_error();
    assert!(cache.last_error().is_none());
    assert_eq!(cache.len(), 3);
}

#[tokio::test]
async fn test_load_more_failure_keeps_cursor() {
    let (server, cache) = setup(20).await;
    mount_page(&server, 0, 1..21, true).await;
    Mock::given(method("GET"))
        .and(path("/pokemon"))
        .and(query_param("offset", "20"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    cache.refresh().await;
    cache.load_more().await;

    assert_eq!(cache.len(), 20);
    assert_eq!(cache.cursor(), CollectionCursor { offset: 20, has_more: true });
    assert!(
        cache
            .last_error()
            .unwrap()
            .starts_with("Failed to load more catalog items: ")
    );
}

#[tokio::test]
async fn test_concurrent_refresh_fetches_once() {
    let (server, cache) = setup(20).await;
    Mock::given(method("GET"))
        .and(path("/pokemon"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_body(&server.uri(), 1..6, false))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (a, b) = (cache.clone(), cache.clone());
    tokio::join!(a.refresh(), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(b.is_loading_initial());
        b.refresh().await;
    });

    assert_eq!(cache.len(), 5);
    assert!(!cache.is_loading_initial());
}

#[tokio::test]
async fn test_subscribers_see_appended_pages() {
    let (server, cache) = setup(20).await;
    mount_page(&server, 0, 1..21, true).await;
    mount_page(&server, 20, 21..26, false).await;

    let mut stream = cache.subscribe_items();
    assert!(stream.current().is_empty());

    cache.refresh().await;
    let snap = stream.changed().await.unwrap();
    assert_eq!(snap.len(), 20);

    cache.load_more().await;
    assert_eq!(stream.latest().len(), 25);
}

#[tokio::test]
async fn test_reset_returns_to_initial_state() {
    let (server, cache) = setup(20).await;
    mount_page(&server, 0, 1..21, true).await;
    Mock::given(method("GET"))
        .and(path("/pokemon/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body(4)))
        .mount(&server)
        .await;

    cache.refresh().await;
    cache.load_detail(4).await.unwrap();
    cache.reset();

    assert!(cache.is_empty());
    assert!(cache.detail(4).is_none());
    assert_eq!(cache.detail_count(), 0);
    assert_eq!(cache.cursor(), CollectionCursor::default());
    assert!(cache.last_error().is_none());
}

// ── Details ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_concurrent_detail_loads_share_one_fetch() {
    let (server, cache) = setup(20).await;
    Mock::given(method("GET"))
        .and(path("/pokemon/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(detail_body(7))
                .set_delay(Duration::from_millis(150)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (a, b) = tokio::join!(cache.load_detail(7), cache.load_detail(7));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.types, vec!["water"]);
    assert_eq!(a.abilities, vec!["torrent"]);
    assert!(!cache.is_loading_detail());

    // Served from cache afterwards.
    let c = cache.load_detail(7).await.unwrap();
    assert!(Arc::ptr_eq(&a, &c));
    assert!(Arc::ptr_eq(&a, &cache.detail(7).unwrap()));
}

#[tokio::test]
async fn test_detail_loading_flag_tracks_in_flight_fetch() {
    let (server, cache) = setup(20).await;
    Mock::given(method("GET"))
        .and(path("/pokemon/3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(detail_body(3))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let observer = cache.clone();
    tokio::join!(cache.load_detail(3), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(observer.is_loading_detail());
    });
    assert!(!cache.is_loading_detail());
}

#[tokio::test]
async fn test_failed_detail_stays_fetchable() {
    let (server, cache) = setup(20).await;
    Mock::given(method("GET"))
        .and(path("/pokemon/9"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pokemon/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body(9)))
        .mount(&server)
        .await;

    assert!(cache.load_detail(9).await.is_none());
    let error = cache.last_error().unwrap();
    assert!(error.starts_with("Failed to load detail for #9: "), "{error}");
    assert!(cache.detail(9).is_none());

    let detail = cache.load_detail(9).await.unwrap();
    assert_eq!(detail.id, 9);
}

#[tokio::test]
async fn test_missing_detail_records_not_found() {
    let (server, cache) = setup(20).await;
    Mock::given(method("GET"))
        .and(path("/pokemon/9999"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    assert!(cache.load_detail(9999).await.is_none());
    assert!(cache.last_error().unwrap().contains("#9999"));
}

#[tokio::test]
async fn test_item_stream_yields_snapshots() {
    use futures::StreamExt;

    let (server, cache) = setup(20).await;
    mount_page(&server, 0, 1..4, false).await;

    let mut stream = cache.subscribe_items().into_stream();
    assert!(stream.next().await.unwrap().is_empty());

    cache.refresh().await;
    let snap = stream.next().await.unwrap();
    assert_eq!(snap.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(), vec![
        "mon-1", "mon-2", "mon-3"
    ]);
}
