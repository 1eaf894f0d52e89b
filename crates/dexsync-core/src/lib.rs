// dexsync-core: Offline-first data layer between dexsync-api and consumers.

pub mod config;
pub mod connectivity;
pub mod convert;
pub mod engine;
pub mod error;
pub mod favorites;
pub mod model;
pub mod storage;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ClientConfig, DEFAULT_CONNECTIVITY_INTERVAL, DEFAULT_PAGE_SIZE};
pub use connectivity::{ConnectivityMonitor, Reachability};
pub use engine::{Engine, FileFavorites};
pub use error::CoreError;
pub use favorites::{FavoritesState, FavoritesStore, SyncOutcome, spawn_auto_sync};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::CollectionCache;
pub use stream::{ItemStream, Snapshot};

pub use model::{
    CatalogItemDetail, CatalogItemSummary, CollectionCursor, ConnectivityState, FavoriteEntry,
    FavoriteInput, PendingSyncAction, SyncActionKind,
};
