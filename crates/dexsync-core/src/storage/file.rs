// One file per key under a data directory. Writes go to a sibling temp
// file first and are renamed into place.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Storage, StorageError};

/// Filesystem-backed [`Storage`].
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the key files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{key}.json.tmp"))
    }
}

impl Storage for FileStorage {
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StorageError>> + Send {
        let path = self.path_for(key);
        async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => Ok(Some(contents)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        }
    }

    fn set(
        &self,
        key: &str,
        value: String,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        let path = self.path_for(key);
        let tmp = self.temp_path_for(key);
        let dir = self.dir.clone();
        async move {
            tokio::fs::create_dir_all(&dir).await?;
            tokio::fs::write(&tmp, value.as_bytes()).await?;
            tokio::fs::rename(&tmp, &path).await?;
            debug!(path = %path.display(), bytes = value.len(), "wrote storage key");
            Ok(())
        }
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send {
        let path = self.path_for(key);
        async move {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.get("favorites").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        storage.set("favorites", "[1]".into()).await.unwrap();
        storage.set("favorites", "[2]".into()).await.unwrap();

        assert_eq!(storage.get("favorites").await.unwrap().as_deref(), Some("[2]"));
        assert!(!dir.path().join("nested/.favorites.json.tmp").exists());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.set("lastSyncTime", "\"x\"".into()).await.unwrap();
        storage.remove("lastSyncTime").await.unwrap();
        storage.remove("lastSyncTime").await.unwrap();

        assert!(storage.get("lastSyncTime").await.unwrap().is_none());
    }
}
