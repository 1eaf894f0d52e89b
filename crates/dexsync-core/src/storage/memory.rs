// In-process storage, used by tests and ephemeral sessions.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;

use super::{Storage, StorageError};

/// [`Storage`] backed by a shared map. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous read, for assertions.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StorageError>> + Send {
        let value = self.peek(key);
        async move { Ok(value) }
    }

    fn set(
        &self,
        key: &str,
        value: String,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        self.entries.insert(key.to_owned(), value);
        async { Ok(()) }
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send {
        self.entries.remove(key);
        async { Ok(()) }
    }
}
