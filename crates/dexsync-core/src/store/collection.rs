// ── Paginated collection cache ──
//
// Holds catalog entries discovered so far, in remote order, and pages
// forward through the catalog client. At most one list fetch runs at a
// time: `refresh` and `load_more` claim a shared loading word and the
// loser returns without fetching.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, warn};

use dexsync_api::CatalogClient;

use super::details::DetailCache;
use crate::error::CoreError;
use crate::model::{CatalogItemDetail, CatalogItemSummary, CollectionCursor};
use crate::stream::{ItemStream, Snapshot};

const IDLE: u8 = 0;
const LOADING_INITIAL: u8 = 1;
const LOADING_MORE: u8 = 2;

/// Locally cached, forward-paged view of the remote catalog.
///
/// Cheaply cloneable; clones share state.
#[derive(Clone)]
pub struct CollectionCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    client: CatalogClient,
    page_size: u32,
    loading: AtomicU8,
    /// Bumped by `reset`; results of fetches started earlier are discarded.
    generation: AtomicU64,
    items: watch::Sender<Snapshot<CatalogItemSummary>>,
    cursor: watch::Sender<CollectionCursor>,
    last_error: watch::Sender<Option<String>>,
    details: DetailCache,
}

/// Releases the loading word when a list fetch ends or is dropped.
struct LoadingGuard<'a>(&'a AtomicU8);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(IDLE, Ordering::Release);
    }
}

impl CacheInner {
    fn claim(&self, state: u8) -> Option<LoadingGuard<'_>> {
        self.loading
            .compare_exchange(IDLE, state, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LoadingGuard(&self.loading))
    }

    fn record_error(&self, message: String) {
        warn!(error = %message, "catalog cache operation failed");
        self.last_error.send_replace(Some(message));
    }
}

impl CollectionCache {
    pub fn new(client: CatalogClient, page_size: u32) -> Self {
        let (items, _) = watch::channel(Arc::new(Vec::new()));
        let (cursor, _) = watch::channel(CollectionCursor::default());
        let (last_error, _) = watch::channel(None);
        Self {
            inner: Arc::new(CacheInner {
                client,
                page_size,
                loading: AtomicU8::new(IDLE),
                generation: AtomicU64::new(0),
                items,
                cursor,
                last_error,
                details: DetailCache::default(),
            }),
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn items(&self) -> Snapshot<CatalogItemSummary> {
        self.inner.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    pub fn cursor(&self) -> CollectionCursor {
        *self.inner.cursor.borrow()
    }

    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }

    /// Cached detail for `id`, without fetching.
    pub fn detail(&self, id: u32) -> Option<Arc<CatalogItemDetail>> {
        self.inner.details.get(id)
    }

    pub fn detail_count(&self) -> usize {
        self.inner.details.len()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error.borrow().clone()
    }

    pub fn clear_error(&self) {
        self.inner.last_error.send_replace(None);
    }

    pub fn is_loading_initial(&self) -> bool {
        self.inner.loading.load(Ordering::Acquire) == LOADING_INITIAL
    }

    pub fn is_loading_more(&self) -> bool {
        self.inner.loading.load(Ordering::Acquire) == LOADING_MORE
    }

    pub fn is_loading_detail(&self) -> bool {
        self.inner.details.is_loading()
    }

    pub fn subscribe_items(&self) -> ItemStream<CatalogItemSummary> {
        ItemStream::new(self.inner.items.subscribe())
    }

    pub fn subscribe_errors(&self) -> watch::Receiver<Option<String>> {
        self.inner.last_error.subscribe()
    }

    // ── Paging ───────────────────────────────────────────────────────

    /// Fetch the first page and replace the cached items with it.
    ///
    /// No-op while another list fetch is running. On failure the items are
    /// kept and the error recorded.
    pub async fn refresh(&self) {
        let inner = &self.inner;
        let Some(_guard) = inner.claim(LOADING_INITIAL) else {
            debug!("catalog fetch already in flight, skipping refresh");
            return;
        };
        let generation = inner.generation.load(Ordering::Acquire);

        match inner.client.list_page(inner.page_size, 0).await {
            Ok(page) => {
                if inner.generation.load(Ordering::Acquire) != generation {
                    debug!("cache reset during refresh, discarding page");
                    return;
                }
                let items: Vec<Arc<CatalogItemSummary>> = page
                    .items
                    .into_iter()
                    .map(|r| Arc::new(CatalogItemSummary::from(r)))
                    .collect();
                let offset = items.len();
                debug!(count = offset, has_more = page.has_next, "catalog refreshed");
                inner.items.send_replace(Arc::new(items));
                inner.cursor.send_replace(CollectionCursor {
                    offset,
                    has_more: page.has_next,
                });
                inner.last_error.send_replace(None);
            }
            Err(e) => inner.record_error(format!("Failed to load catalog: {e}")),
        }
    }

    /// Fetch the page after the last one and append it.
    ///
    /// No-op while another list fetch is running or once the end of the
    /// catalog has been reached.
    pub async fn load_more(&self) {
        let inner = &self.inner;
        if !self.cursor().has_more {
            debug!("catalog exhausted, skipping load_more");
            return;
        }
        let Some(_guard) = inner.claim(LOADING_MORE) else {
            debug!("catalog fetch already in flight, skipping load_more");
            return;
        };
        let cursor = self.cursor();
        if !cursor.has_more {
            return;
        }
        let generation = inner.generation.load(Ordering::Acquire);

        match inner.client.list_page(inner.page_size, cursor.offset).await {
            Ok(page) => {
                if inner.generation.load(Ordering::Acquire) != generation {
                    debug!("cache reset during load_more, discarding page");
                    return;
                }
                let fetched = page.items.len();
                inner.items.send_modify(|items| {
                    let mut next = Vec::with_capacity(items.len() + fetched);
                    next.extend(items.iter().cloned());
                    next.extend(
                        page.items
                            .into_iter()
                            .map(|r| Arc::new(CatalogItemSummary::from(r))),
                    );
                    *items = Arc::new(next);
                });
                inner.cursor.send_replace(CollectionCursor {
                    offset: cursor.offset + fetched,
                    has_more: page.has_next,
                });
                debug!(
                    fetched,
                    offset = cursor.offset + fetched,
                    has_more = page.has_next,
                    "catalog page appended"
                );
            }
            Err(e) => inner.record_error(format!("Failed to load more catalog items: {e}")),
        }
    }

    // ── Details ──────────────────────────────────────────────────────

    /// Return the detail for `id`, fetching it on first use.
    ///
    /// Concurrent calls for the same id share one fetch. On failure the
    /// error is recorded and `None` returned; a later call retries.
    pub async fn load_detail(&self, id: u32) -> Option<Arc<CatalogItemDetail>> {
        match self.fetch_detail(id).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                self.inner
                    .record_error(format!("Failed to load detail for #{id}: {e}"));
                None
            }
        }
    }

    /// Like [`load_detail`](Self::load_detail), but returns the failure
    /// instead of recording it.
    pub async fn fetch_detail(&self, id: u32) -> Result<Arc<CatalogItemDetail>, CoreError> {
        let client = &self.inner.client;
        self.inner
            .details
            .get_or_fetch(id, || async move {
                client
                    .fetch_detail(id)
                    .await
                    .map(CatalogItemDetail::from)
                    .map_err(CoreError::from)
            })
            .await
    }

    /// Return to the initial empty state: no items, no details, cursor at
    /// the start, no error. Fetches in flight are discarded when they land.
    pub fn reset(&self) {
        let inner = &self.inner;
        inner.generation.fetch_add(1, Ordering::AcqRel);
        inner.items.send_replace(Arc::new(Vec::new()));
        inner.cursor.send_replace(CollectionCursor::default());
        inner.last_error.send_replace(None);
        inner.details.clear();
        debug!("catalog cache reset");
    }
}
