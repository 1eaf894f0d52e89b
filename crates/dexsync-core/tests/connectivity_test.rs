#![allow(clippy::unwrap_used)]
// Integration tests for `ConnectivityMonitor` probing a mocked catalog.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dexsync_api::{CatalogClient, RetryPolicy, TransportConfig};
use dexsync_core::{ConnectivityMonitor, Reachability};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(interval: Duration) -> (MockServer, ConnectivityMonitor) {
    let server = MockServer::start().await;
    let client = CatalogClient::new(&server.uri(), &TransportConfig::default())
        .unwrap()
        .with_retry(RetryPolicy::NONE);
    (server, ConnectivityMonitor::new(client, interval))
}

fn probe_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "bulbasaur"}))
}

async fn probe_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/pokemon/1")
        .count()
}

// ── On-demand checks ────────────────────────────────────────────────

#[tokio::test]
async fn test_check_now_tracks_probe_result() {
    let (server, monitor) = setup(Duration::from_secs(30)).await;
    Mock::given(method("GET"))
        .and(path("/pokemon/1"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pokemon/1"))
        .respond_with(probe_ok())
        .mount(&server)
        .await;

    monitor.check_now().await;
    assert!(!monitor.is_online());
    let first = monitor.state().last_checked_at.unwrap();

    monitor.check_now().await;
    assert!(monitor.is_online());
    assert!(monitor.state().last_checked_at.unwrap() >= first);
    assert!(!monitor.is_checking());
}

#[tokio::test]
async fn test_concurrent_checks_probe_once() {
    let (server, monitor) = setup(Duration::from_secs(30)).await;
    Mock::given(method("GET"))
        .and(path("/pokemon/1"))
        .respond_with(probe_ok().set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;

    let other = monitor.clone();
    tokio::join!(monitor.check_now(), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(other.is_checking());
        other.check_now().await;
    });

    assert!(!monitor.is_checking());
    assert!(monitor.is_online());
}

#[tokio::test]
async fn test_set_online_overrides_without_probe() {
    let (server, monitor) = setup(Duration::from_secs(30)).await;
    let mut rx = monitor.subscribe();

    monitor.set_online(false);
    rx.changed().await.unwrap();
    assert!(!rx.borrow().is_online);

    monitor.set_online(true);
    assert!(monitor.is_online());
    assert_eq!(probe_count(&server).await, 0);
}

#[tokio::test]
async fn test_monitor_reports_reachability() {
    let (server, monitor) = setup(Duration::from_secs(30)).await;
    Mock::given(method("GET"))
        .and(path("/pokemon/1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(!monitor.is_reachable().await);
    assert!(!monitor.is_online());
}

// ── Periodic checks ─────────────────────────────────────────────────

#[tokio::test]
async fn test_start_periodic_checks_immediately_and_repeats() {
    let (server, monitor) = setup(Duration::from_millis(100)).await;
    Mock::given(method("GET"))
        .and(path("/pokemon/1"))
        .respond_with(probe_ok())
        .mount(&server)
        .await;

    monitor.start_periodic().await;
    assert_eq!(probe_count(&server).await, 1);
    assert!(monitor.is_periodic_running().await);

    tokio::time::sleep(Duration::from_millis(350)).await;
    monitor.stop_periodic().await;
    let after_stop = probe_count(&server).await;
    assert!(after_stop >= 3, "expected repeated probes, saw {after_stop}");

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(probe_count(&server).await, after_stop);
    assert!(!monitor.is_periodic_running().await);
}

#[tokio::test]
async fn test_restarting_replaces_previous_task() {
    let (server, monitor) = setup(Duration::from_millis(100)).await;
    Mock::given(method("GET"))
        .and(path("/pokemon/1"))
        .respond_with(probe_ok())
        .mount(&server)
        .await;

    monitor.start_periodic().await;
    monitor.start_periodic().await;
    monitor.start_periodic().await;
    let started = probe_count(&server).await;
    assert_eq!(started, 3);

    tokio::time::sleep(Duration::from_millis(450)).await;
    monitor.stop_periodic().await;

    // One timer at 100ms over ~450ms yields about four ticks; three
    // stacked timers would yield about twelve.
    let ticks = probe_count(&server).await - started;
    assert!(ticks <= 6, "timers stacked: {ticks} ticks");

    monitor.stop_periodic().await;
}
