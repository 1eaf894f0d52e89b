// ── Connectivity monitor ──
//
// Tracks whether the catalog service is reachable. A probe runs on demand
// (`check_now`) or on a timer owned by the monitor (`start_periodic`).
// State is published through a `watch` channel.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use dexsync_api::CatalogClient;

use crate::model::ConnectivityState;

// ── Reachability seam ────────────────────────────────────────────

/// Answers "can the remote be reached right now?".
///
/// The favorites store depends on this rather than on the monitor so tests
/// can script the answer.
pub trait Reachability: Send + Sync + 'static {
    fn is_reachable(&self) -> impl Future<Output = bool> + Send;
}

impl Reachability for CatalogClient {
    fn is_reachable(&self) -> impl Future<Output = bool> + Send {
        self.probe()
    }
}

impl<R: Reachability> Reachability for Arc<R> {
    fn is_reachable(&self) -> impl Future<Output = bool> + Send {
        (**self).is_reachable()
    }
}

// ── ConnectivityMonitor ──────────────────────────────────────────

/// Reachability signal for the catalog service.
///
/// Cheaply cloneable; clones share state and the periodic task. The task
/// keeps the shared state alive until [`stop_periodic`](Self::stop_periodic)
/// is called.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    client: CatalogClient,
    interval: Duration,
    state: watch::Sender<ConnectivityState>,
    periodic: Mutex<Option<PeriodicTask>>,
}

struct PeriodicTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    fn stop(self) {
        self.cancel.cancel();
        drop(self.handle);
    }
}

/// Clears the in-flight flag even if the probing future is dropped.
struct CheckGuard<'a>(&'a MonitorInner);

impl Drop for CheckGuard<'_> {
    fn drop(&mut self) {
        self.0.state.send_modify(|s| s.is_checking = false);
    }
}

impl MonitorInner {
    /// Claim the probe slot. The flag lives in the published state, so
    /// claiming and observing it go through the same channel lock.
    fn try_claim(&self) -> Option<CheckGuard<'_>> {
        let claimed = self.state.send_if_modified(|s| {
            if s.is_checking {
                return false;
            }
            s.is_checking = true;
            true
        });
        if claimed { Some(CheckGuard(self)) } else { None }
    }

    async fn check_now(&self) {
        let Some(guard) = self.try_claim() else {
            debug!("connectivity check already in flight");
            return;
        };
        self.probe(guard).await;
    }

    /// Probe, or wait for the probe already in flight, and return the
    /// result either way. A probe that ends without recording a result
    /// (its future was dropped) is retried.
    async fn check_and_wait(&self) -> bool {
        loop {
            if let Some(guard) = self.try_claim() {
                return self.probe(guard).await;
            }
            debug!("waiting for in-flight connectivity check");
            let mut rx = self.state.subscribe();
            let seen = rx.borrow_and_update().last_checked_at;
            let Ok(state) = rx.wait_for(|s| !s.is_checking).await.map(|s| *s) else {
                return false;
            };
            if state.last_checked_at != seen {
                return state.is_online;
            }
        }
    }

    async fn probe(&self, _guard: CheckGuard<'_>) -> bool {
        let online = self.client.probe().await;
        let was_online = self.state.borrow().is_online;
        self.state.send_modify(|s| {
            s.is_online = online;
            s.last_checked_at = Some(Utc::now());
        });

        if online == was_online {
            debug!(online, "connectivity unchanged");
        } else {
            info!(online, "connectivity changed");
        }
        online
    }
}

impl ConnectivityMonitor {
    /// Create a monitor probing through `client` every `interval` once
    /// started. Assumes online until the first probe.
    pub fn new(client: CatalogClient, interval: Duration) -> Self {
        let (state, _) = watch::channel(ConnectivityState::default());
        Self {
            inner: Arc::new(MonitorInner {
                client,
                interval,
                state,
                periodic: Mutex::new(None),
            }),
        }
    }

    // ── Observability ────────────────────────────────────────────

    pub fn state(&self) -> ConnectivityState {
        *self.inner.state.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.inner.state.borrow().is_online
    }

    pub fn is_checking(&self) -> bool {
        self.inner.state.borrow().is_checking
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.inner.state.subscribe()
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    // ── Operations ───────────────────────────────────────────────

    /// Probe the remote once and record the result.
    ///
    /// A call made while another probe is in flight returns immediately
    /// without probing. Never fails.
    pub async fn check_now(&self) {
        self.inner.check_now().await;
    }

    /// Override the signal without probing.
    pub fn set_online(&self, online: bool) {
        self.inner.state.send_modify(|s| {
            s.is_online = online;
            s.last_checked_at = Some(Utc::now());
        });
        debug!(online, "connectivity set manually");
    }

    /// Probe now, then keep probing every interval in the background.
    ///
    /// Replaces any task started earlier; there is never more than one.
    pub async fn start_periodic(&self) {
        self.stop_periodic().await;
        self.check_now().await;

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(periodic_task(
            Arc::clone(&self.inner),
            self.inner.interval,
            cancel.clone(),
        ));

        let mut slot = self.inner.periodic.lock().await;
        if let Some(previous) = slot.replace(PeriodicTask { cancel, handle }) {
            previous.stop();
        }
        debug!(interval = ?self.inner.interval, "periodic connectivity checks started");
    }

    /// Stop the background task. Safe to call when none is running.
    pub async fn stop_periodic(&self) {
        if let Some(task) = self.inner.periodic.lock().await.take() {
            task.stop();
            debug!("periodic connectivity checks stopped");
        }
    }

    pub async fn is_periodic_running(&self) -> bool {
        self.inner
            .periodic
            .lock()
            .await
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }
}

/// Probes before answering. A probe already in flight is awaited rather
/// than duplicated, so the answer never predates the call.
impl Reachability for ConnectivityMonitor {
    fn is_reachable(&self) -> impl Future<Output = bool> + Send {
        self.inner.check_and_wait()
    }
}

async fn periodic_task(inner: Arc<MonitorInner>, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => inner.check_now().await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dexsync_api::TransportConfig;

    fn unreachable_client() -> CatalogClient {
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        CatalogClient::new("http://127.0.0.1:9/api/v2/", &TransportConfig::default())
            .unwrap()
            .with_retry(dexsync_api::RetryPolicy::NONE)
    }

    #[test]
    fn starts_online_and_unchecked() {
        let monitor = ConnectivityMonitor::new(unreachable_client(), Duration::from_secs(30));
        let state = monitor.state();
        assert!(state.is_online);
        assert!(!state.is_checking);
        assert!(state.last_checked_at.is_none());
    }

    #[test]
    fn set_online_stamps_check_time() {
        let monitor = ConnectivityMonitor::new(unreachable_client(), Duration::from_secs(30));
        monitor.set_online(false);
        let state = monitor.state();
        assert!(!state.is_online);
        assert!(state.last_checked_at.is_some());
    }

    #[tokio::test]
    async fn stop_without_start_is_noop() {
        let monitor = ConnectivityMonitor::new(unreachable_client(), Duration::from_secs(30));
        monitor.stop_periodic().await;
        monitor.stop_periodic().await;
        assert!(!monitor.is_periodic_running().await);
    }

    #[tokio::test]
    async fn failed_probe_marks_offline() {
        let monitor = ConnectivityMonitor::new(unreachable_client(), Duration::from_secs(30));
        let mut rx = monitor.subscribe();

        monitor.check_now().await;

        assert!(!monitor.is_online());
        assert!(!monitor.is_checking());
        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().is_online);
    }
}
