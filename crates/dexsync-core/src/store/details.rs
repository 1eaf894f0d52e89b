// ── Per-id detail cache ──
//
// One `OnceCell` per id. Concurrent lookups of the same id share the cell,
// so a successful fetch happens at most once and every caller receives the
// same `Arc`. A failed fetch leaves the cell empty and the id fetchable.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::model::CatalogItemDetail;

type Cell = Arc<OnceCell<Arc<CatalogItemDetail>>>;

#[derive(Default)]
pub(crate) struct DetailCache {
    cells: DashMap<u32, Cell>,
    in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl DetailCache {
    pub(crate) fn get(&self, id: u32) -> Option<Arc<CatalogItemDetail>> {
        self.cells.get(&id).and_then(|cell| cell.get().cloned())
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.iter().filter(|c| c.value().initialized()).count()
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    /// Return the cached detail for `id`, running `fetch` if there is none.
    pub(crate) async fn get_or_fetch<F, Fut, E>(
        &self,
        id: u32,
        fetch: F,
    ) -> Result<Arc<CatalogItemDetail>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CatalogItemDetail, E>>,
    {
        // Clone the cell out so no map shard lock is held across the await.
        let cell: Cell = Arc::clone(self.cells.entry(id).or_default().value());
        cell.get_or_try_init(|| async {
            let _guard = InFlight::enter(&self.in_flight);
            fetch().await.map(Arc::new)
        })
        .await
        .cloned()
    }

    /// Drop every cached detail. Fetches still running complete into
    /// detached cells and are not observed.
    pub(crate) fn clear(&self) {
        self.cells.clear();
    }
}
