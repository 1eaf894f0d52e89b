use thiserror::Error;

/// Top-level error type for the `dexsync-api` crate.
///
/// Covers every failure mode of the catalog service: transport, HTTP
/// status, missing resources, and payload decoding. `dexsync-core` maps
/// these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-success HTTP status from the catalog service.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Every attempt of a single logical request failed.
    #[error("Request failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<Error> },

    // ── Catalog ─────────────────────────────────────────────────────
    /// The requested catalog entry does not exist.
    #[error("Catalog entry #{id} not found")]
    NotFound { id: u32 },

    /// A resource URL did not end in a numeric id.
    #[error("Cannot derive an id from resource URL {url:?}")]
    InvalidResourceUrl { url: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// 404 responses and malformed payloads are permanent; every other
    /// transport or status failure is treated as a blip.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.status().is_none_or(|s| s != reqwest::StatusCode::NOT_FOUND),
            Self::Status { status, .. } => *status != 404,
            Self::RetriesExhausted { .. } => true,
            Self::InvalidUrl(_)
            | Self::NotFound { .. }
            | Self::InvalidResourceUrl { .. }
            | Self::Deserialization { .. } => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::Status { status: 404, .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }
}
