// ── Favorites ──
//
// The user's favorite subset, its durable persistence, the queue of
// pending add/remove intents, and reconciliation of that queue once the
// catalog is reachable again.

mod reconcile;
mod store;

pub use reconcile::spawn_auto_sync;
pub use store::{FavoritesState, FavoritesStore, SyncOutcome};
