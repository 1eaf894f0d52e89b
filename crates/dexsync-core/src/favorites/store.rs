// ── Favorites sync store ──
//
// Local mutations publish optimistically, then persist. Every writer
// (load, add, remove, sync commit, clear) holds `write_lock`, so queued
// actions land in call order and a rollback always restores the state the
// writer itself observed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use dexsync_api::CatalogClient;

use crate::connectivity::Reachability;
use crate::error::CoreError;
use crate::model::{FavoriteEntry, FavoriteInput, PendingSyncAction, SyncActionKind};
use crate::storage::{FAVORITES_KEY, LAST_SYNC_KEY, PENDING_ACTIONS_KEY, Storage, StorageError};

// ── Observable state ─────────────────────────────────────────────

/// Everything the favorites store publishes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FavoritesState {
    pub favorites: Vec<FavoriteEntry>,
    pub pending_actions: Vec<PendingSyncAction>,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub is_loading: bool,
    pub is_syncing: bool,
    pub last_error: Option<String>,
}

/// What a call to [`FavoritesStore::sync`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Another sync was running, or nothing was pending.
    Skipped,
    /// The remote was unreachable; the queue is untouched.
    Offline,
    /// The queue was acknowledged and cleared.
    Reconciled { actions: usize },
    /// Persisting the cleared queue failed; the queue is untouched.
    Failed,
}

/// A planned change: the next favorites list and the action to queue.
struct Mutation {
    favorites: Vec<FavoriteEntry>,
    action: PendingSyncAction,
}

// ── FavoritesStore ───────────────────────────────────────────────

/// Offline-first store for the user's favorites.
///
/// Cheaply cloneable; clones share state. Failures are recorded in
/// [`last_error`](Self::last_error) rather than returned.
pub struct FavoritesStore<S: Storage, R: Reachability> {
    inner: Arc<FavoritesInner<S, R>>,
}

impl<S: Storage, R: Reachability> Clone for FavoritesStore<S, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct FavoritesInner<S, R> {
    storage: S,
    reachability: R,
    client: CatalogClient,
    write_lock: Mutex<()>,
    syncing: AtomicBool,
    state: watch::Sender<FavoritesState>,
}

/// Clears the syncing flag when a sync pass ends or is dropped.
struct SyncGuard<'a> {
    flag: &'a AtomicBool,
    state: &'a watch::Sender<FavoritesState>,
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.is_syncing = false);
        self.flag.store(false, Ordering::Release);
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, StorageError> {
    Ok(serde_json::to_string(value)?)
}

/// Parse a stored JSON value, treating corruption as absence.
fn decode_or_default<T: DeserializeOwned + Default>(key: &str, raw: Option<String>) -> T {
    let Some(raw) = raw else {
        return T::default();
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "ignoring corrupt stored value");
            T::default()
        }
    }
}

/// Stored as a JSON string; a bare RFC 3339 string is also accepted.
fn decode_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let text = serde_json::from_str::<String>(&raw).unwrap_or_else(|_| raw.trim().to_owned());
    match DateTime::parse_from_rfc3339(&text) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            warn!(key = LAST_SYNC_KEY, error = %e, "ignoring corrupt stored value");
            None
        }
    }
}

impl<S: Storage, R: Reachability> FavoritesStore<S, R> {
    /// Create an empty store. Call [`load`](Self::load) to read persisted
    /// state. `client` supplies image URLs for new entries.
    pub fn new(storage: S, reachability: R, client: CatalogClient) -> Self {
        let (state, _) = watch::channel(FavoritesState::default());
        Self {
            inner: Arc::new(FavoritesInner {
                storage,
                reachability,
                client,
                write_lock: Mutex::new(()),
                syncing: AtomicBool::new(false),
                state,
            }),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn state(&self) -> FavoritesState {
        self.inner.state.borrow().clone()
    }

    pub fn favorites(&self) -> Vec<FavoriteEntry> {
        self.inner.state.borrow().favorites.clone()
    }

    pub fn pending_actions(&self) -> Vec<PendingSyncAction> {
        self.inner.state.borrow().pending_actions.clone()
    }

    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.inner.state.borrow().last_sync_time
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.state.borrow().last_error.clone()
    }

    pub fn clear_error(&self) {
        self.inner.state.send_modify(|s| s.last_error = None);
    }

    pub fn is_favorite(&self, id: u32) -> bool {
        self.inner.state.borrow().favorites.iter().any(|f| f.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    pub fn is_syncing(&self) -> bool {
        self.inner.state.borrow().is_syncing
    }

    pub fn subscribe(&self) -> watch::Receiver<FavoritesState> {
        self.inner.state.subscribe()
    }

    pub fn storage(&self) -> &S {
        &self.inner.storage
    }

    // ── Persistence helpers ──────────────────────────────────────────

    async fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CoreError> {
        let encoded = encode(value).map_err(|e| CoreError::persistence(key, &e))?;
        self.inner
            .storage
            .set(key, encoded)
            .await
            .map_err(|e| CoreError::persistence(key, &e))
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.inner.storage.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "failed to read stored value");
                self.record_error(format!(
                    "Failed to load favorites: {}",
                    CoreError::persistence(key, &e)
                ));
                None
            }
        }
    }

    /// Put the stored last sync time back to `previous` after a failed
    /// commit.
    async fn restore_last_sync(&self, previous: Option<DateTime<Utc>>) {
        let restored = match previous {
            Some(ts) => self.persist(LAST_SYNC_KEY, &ts).await,
            None => self
                .inner
                .storage
                .remove(LAST_SYNC_KEY)
                .await
                .map_err(|e| CoreError::persistence(LAST_SYNC_KEY, &e)),
        };
        if let Err(e) = restored {
            warn!(error = %e, "failed to restore stored last sync time");
        }
    }

    fn record_error(&self, message: String) {
        warn!(error = %message, "favorites operation failed");
        self.inner.state.send_modify(|s| s.last_error = Some(message));
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Read favorites, pending actions, and the last sync time from
    /// storage. Absent or corrupt values load as empty.
    pub async fn load(&self) {
        let _lock = self.inner.write_lock.lock().await;
        self.inner.state.send_modify(|s| s.is_loading = true);

        let favorites: Vec<FavoriteEntry> =
            decode_or_default(FAVORITES_KEY, self.read(FAVORITES_KEY).await);
        let pending_actions: Vec<PendingSyncAction> =
            decode_or_default(PENDING_ACTIONS_KEY, self.read(PENDING_ACTIONS_KEY).await);
        let last_sync_time = decode_timestamp(self.read(LAST_SYNC_KEY).await);

        debug!(
            favorites = favorites.len(),
            pending = pending_actions.len(),
            "favorites loaded"
        );
        self.inner.state.send_modify(|s| {
            s.favorites = favorites;
            s.pending_actions = pending_actions;
            s.last_sync_time = last_sync_time;
            s.is_loading = false;
        });
    }

    /// Mark `item` as favorite and queue an `add` action. No-op if it
    /// already is one.
    pub async fn add(&self, item: FavoriteInput) {
        let image_url = self.inner.client.image_url(item.id);
        self.mutate_optimistically("Failed to add to favorites", |favorites| {
            if favorites.iter().any(|f| f.id == item.id) {
                debug!(id = item.id, "already a favorite");
                return None;
            }
            let now = Utc::now();
            let entry = FavoriteEntry {
                id: item.id,
                name: item.name,
                image_url,
                added_at: now,
            };
            let mut next = favorites.to_vec();
            next.push(entry.clone());
            Some(Mutation {
                favorites: next,
                action: PendingSyncAction::new(SyncActionKind::Add, entry, now),
            })
        })
        .await;
    }

    /// Unmark `id` and queue a `remove` action carrying the removed entry.
    /// No-op if it is not a favorite.
    pub async fn remove(&self, id: u32) {
        self.mutate_optimistically("Failed to remove from favorites", |favorites| {
            let Some(removed) = favorites.iter().find(|f| f.id == id).cloned() else {
                debug!(id, "not a favorite");
                return None;
            };
            let next = favorites.iter().filter(|f| f.id != id).cloned().collect();
            Some(Mutation {
                favorites: next,
                action: PendingSyncAction::new(SyncActionKind::Remove, removed, Utc::now()),
            })
        })
        .await;
    }

    /// Snapshot, publish the planned change, persist, and restore the
    /// snapshot if either write fails.
    async fn mutate_optimistically<F>(&self, context: &str, plan: F)
    where
        F: FnOnce(&[FavoriteEntry]) -> Option<Mutation>,
    {
        let _lock = self.inner.write_lock.lock().await;
        let (before_favorites, before_pending) = {
            let s = self.inner.state.borrow();
            (s.favorites.clone(), s.pending_actions.clone())
        };
        let Some(Mutation { favorites, action }) = plan(&before_favorites) else {
            return;
        };
        let (id, kind) = (action.entry.id, action.kind);

        self.inner
            .state
            .send_modify(|s| s.favorites.clone_from(&favorites));
        if let Err(e) = self.persist(FAVORITES_KEY, &favorites).await {
            self.inner.state.send_modify(|s| s.favorites = before_favorites);
            self.record_error(format!("{context}: {e}"));
            return;
        }

        let mut pending = before_pending.clone();
        pending.push(action);
        self.inner
            .state
            .send_modify(|s| s.pending_actions.clone_from(&pending));
        if let Err(e) = self.persist(PENDING_ACTIONS_KEY, &pending).await {
            if let Err(undo) = self.persist(FAVORITES_KEY, &before_favorites).await {
                warn!(error = %undo, "failed to restore stored favorites");
            }
            self.inner.state.send_modify(|s| {
                s.favorites = before_favorites;
                s.pending_actions = before_pending;
            });
            self.record_error(format!("{context}: {e}"));
            return;
        }

        debug!(id, action = %kind, pending = pending.len(), "favorites updated");
    }

    /// Reconcile the pending queue if the remote is reachable.
    ///
    /// At most one sync runs at a time. With an empty queue nothing
    /// happens; when unreachable the queue is left as is.
    //
    // The catalog has no write API, so reconciling means acknowledging the
    // local queue. A remote-backed version would replay each action and
    // drop only the acknowledged ones.
    pub async fn sync(&self) -> SyncOutcome {
        let inner = &self.inner;
        if inner
            .syncing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("favorites sync already in flight");
            return SyncOutcome::Skipped;
        }
        let _guard = SyncGuard {
            flag: &inner.syncing,
            state: &inner.state,
        };

        if inner.state.borrow().pending_actions.is_empty() {
            debug!("no pending favorites actions");
            return SyncOutcome::Skipped;
        }
        inner.state.send_modify(|s| s.is_syncing = true);

        if !inner.reachability.is_reachable().await {
            info!("catalog unreachable, keeping pending favorites actions");
            return SyncOutcome::Offline;
        }

        let _lock = inner.write_lock.lock().await;
        let actions = inner.state.borrow().pending_actions.len();
        if actions == 0 {
            return SyncOutcome::Skipped;
        }

        let previous_sync = inner.state.borrow().last_sync_time;
        let now = Utc::now();
        if let Err(e) = self.persist(LAST_SYNC_KEY, &now).await {
            self.record_error(format!("Failed to sync favorites: {e}"));
            return SyncOutcome::Failed;
        }
        if let Err(e) = self
            .persist(PENDING_ACTIONS_KEY, &[] as &[PendingSyncAction])
            .await
        {
            self.restore_last_sync(previous_sync).await;
            self.record_error(format!("Failed to sync favorites: {e}"));
            return SyncOutcome::Failed;
        }

        inner.state.send_modify(|s| {
            s.pending_actions.clear();
            s.last_sync_time = Some(now);
        });
        info!(actions, "favorites synced");
        SyncOutcome::Reconciled { actions }
    }

    /// Forget all favorites, pending actions, and the last sync time,
    /// in memory and in storage.
    pub async fn clear(&self) {
        let _lock = self.inner.write_lock.lock().await;
        self.inner.state.send_modify(|s| {
            s.favorites.clear();
            s.pending_actions.clear();
            s.last_sync_time = None;
        });

        for key in [FAVORITES_KEY, PENDING_ACTIONS_KEY, LAST_SYNC_KEY] {
            if let Err(e) = self.inner.storage.remove(key).await {
                self.record_error(format!(
                    "Failed to clear favorites: {}",
                    CoreError::persistence(key, &e)
                ));
            }
        }
        debug!("favorites cleared");
    }
}
