// ── Catalog cache ──
//
// Paginated list of discovered catalog entries plus a per-id detail cache.
// Mutations are published through `watch` channels.

mod collection;
mod details;

pub use collection::CollectionCache;
