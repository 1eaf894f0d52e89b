// ── Domain model ──
//
// Canonical types the data layer publishes to consumers. Catalog types are
// built from `dexsync_api` wire types in `convert`; favorites types are
// also the persisted format.

pub mod catalog;
pub mod connectivity;
pub mod favorite;

pub use catalog::{CatalogItemDetail, CatalogItemSummary, CollectionCursor};
pub use connectivity::ConnectivityState;
pub use favorite::{FavoriteEntry, FavoriteInput, PendingSyncAction, SyncActionKind};
