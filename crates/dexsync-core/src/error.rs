// ── Core error types ──
//
// User-facing errors from dexsync-core. Consumers never see HTTP status
// codes or JSON parse failures directly. The `From` impls translate
// transport and storage failures into domain-appropriate variants.

use thiserror::Error;

use crate::storage::StorageError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Remote errors ────────────────────────────────────────────────
    /// The catalog service could not be reached or answered with a failure.
    /// `transient` is true when retrying later may help.
    #[error("Catalog service error: {message}")]
    Remote { message: String, transient: bool },

    #[error("Catalog entry #{id} not found")]
    NotFound { id: u32 },

    // ── Persistence errors ───────────────────────────────────────────
    #[error("Failed to persist '{key}': {message}")]
    Persistence { key: String, message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wrap a storage failure for the given key.
    pub(crate) fn persistence(key: &str, err: &StorageError) -> Self {
        Self::Persistence {
            key: key.to_owned(),
            message: err.to_string(),
        }
    }

    /// Returns `true` if retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Remote { transient: true, .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<dexsync_api::Error> for CoreError {
    fn from(err: dexsync_api::Error) -> Self {
        match err {
            dexsync_api::Error::NotFound { id } => CoreError::NotFound { id },
            dexsync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            dexsync_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            dexsync_api::Error::InvalidResourceUrl { url } => {
                CoreError::Internal(format!("Unexpected resource URL: {url}"))
            }
            other => CoreError::Remote {
                transient: other.is_transient(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_names_the_key() {
        let err = CoreError::persistence(
            "favorites",
            &StorageError::Io(std::io::Error::other("read-only")),
        );
        assert_eq!(
            err.to_string(),
            "Failed to persist 'favorites': I/O error: read-only"
        );
        assert!(!err.is_transient());
    }

    #[test]
    fn not_found_maps_to_domain_variant() {
        let err = CoreError::from(dexsync_api::Error::NotFound { id: 7 });
        assert!(matches!(err, CoreError::NotFound { id: 7 }));
    }

    #[test]
    fn server_errors_stay_transient() {
        let err = CoreError::from(dexsync_api::Error::Status {
            status: 503,
            url: "http://x".into(),
        });
        assert!(err.is_transient());
    }
}
