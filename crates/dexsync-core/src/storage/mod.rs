// ── Durable key-value storage ──
//
// The favorites store persists three JSON values under fixed string keys.
// Backends implement `Storage`; values are opaque strings at this layer.

mod file;
mod memory;

use std::future::Future;

use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Key holding the JSON array of favorite entries.
pub const FAVORITES_KEY: &str = "favorites";
/// Key holding the JSON array of pending sync actions.
pub const PENDING_ACTIONS_KEY: &str = "pendingSyncActions";
/// Key holding the ISO-8601 timestamp of the last reconciliation.
pub const LAST_SYNC_KEY: &str = "lastSyncTime";

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Asynchronous string key-value store.
///
/// `get` of an absent key yields `Ok(None)`; `remove` of an absent key is
/// not an error.
pub trait Storage: Send + Sync + 'static {
    fn get(&self, key: &str)
    -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    fn set(&self, key: &str, value: String)
    -> impl Future<Output = Result<(), StorageError>> + Send;

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}
