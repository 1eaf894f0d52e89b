// ── Engine ──
//
// Wires the catalog client, connectivity monitor, collection cache, and
// favorites store together over file-backed storage, and owns the
// background tasks (periodic probing, sync on reconnect).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use dexsync_api::CatalogClient;

use crate::config::ClientConfig;
use crate::connectivity::ConnectivityMonitor;
use crate::error::CoreError;
use crate::favorites::{FavoritesStore, spawn_auto_sync};
use crate::storage::FileStorage;
use crate::store::CollectionCache;

/// Favorites persisted to disk and gated on the connectivity monitor.
pub type FileFavorites = FavoritesStore<FileStorage, ConnectivityMonitor>;

/// The main entry point for consumers.
///
/// Cheaply cloneable. Construct with [`Engine::new`], then either use the
/// components directly or call [`start`](Self::start) to run the
/// background tasks. Only the first call to `start` has any effect.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: ClientConfig,
    client: CatalogClient,
    monitor: ConnectivityMonitor,
    catalog: CollectionCache,
    favorites: FileFavorites,
    cancel: CancellationToken,
    started: AtomicBool,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Engine {
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let client = config.build_client()?;
        let monitor = ConnectivityMonitor::new(client.clone(), config.connectivity_interval);
        let catalog = CollectionCache::new(client.clone(), config.page_size);
        let favorites = FavoritesStore::new(
            FileStorage::new(&config.data_dir),
            monitor.clone(),
            client.clone(),
        );
        debug!(base_url = %config.base_url, data_dir = %config.data_dir.display(), "engine created");

        Ok(Self {
            inner: Arc::new(EngineInner {
                config,
                client,
                monitor,
                catalog,
                favorites,
                cancel: CancellationToken::new(),
                started: AtomicBool::new(false),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &CatalogClient {
        &self.inner.client
    }

    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.inner.monitor
    }

    pub fn catalog(&self) -> &CollectionCache {
        &self.inner.catalog
    }

    pub fn favorites(&self) -> &FileFavorites {
        &self.inner.favorites
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Load persisted favorites, start periodic connectivity checks, and
    /// sync favorites whenever connectivity comes back.
    pub async fn start(&self) {
        if self.inner.started.swap(true, Ordering::AcqRel) {
            debug!("engine already started");
            return;
        }
        self.inner.favorites.load().await;
        self.inner.monitor.start_periodic().await;

        let handle = spawn_auto_sync(
            &self.inner.monitor,
            self.inner.favorites.clone(),
            self.inner.cancel.clone(),
        );
        self.inner.task_handles.lock().await.push(handle);
        info!(online = self.inner.monitor.is_online(), "engine started");
    }

    /// Stop background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.inner.monitor.stop_periodic().await;

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("engine stopped");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn offline_config(data_dir: &std::path::Path) -> ClientConfig {
        ClientConfig {
            // Nothing listens on the discard port.
            base_url: "http://127.0.0.1:9/api/v2/".parse().unwrap(),
            max_retries: 0,
            connectivity_interval: Duration::from_secs(30),
            data_dir: data_dir.to_path_buf(),
            ..ClientConfig::default()
        }
    }

    #[tokio::test]
    async fn second_start_spawns_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(offline_config(dir.path())).unwrap();

        engine.start().await;
        engine.start().await;
        assert_eq!(engine.inner.task_handles.lock().await.len(), 1);
        assert!(engine.connectivity().is_periodic_running().await);
        assert!(!engine.connectivity().is_online());

        engine.shutdown().await;
        assert!(engine.inner.task_handles.lock().await.is_empty());
        assert!(!engine.connectivity().is_periodic_running().await);
    }
}
