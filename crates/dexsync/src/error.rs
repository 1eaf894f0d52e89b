//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use dexsync_config::ConfigError;
use dexsync_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Remote ───────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(dexsync::remote),
        help(
            "The catalog at {url} could not be reached or returned an error.\n\
             Check connectivity with: dexsync status"
        )
    )]
    Remote { message: String, url: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(dexsync::not_found),
        help("Run: dexsync {list_command} to see available entries")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Persistence ──────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(dexsync::persistence),
        help("Check that {data_dir} exists and is writable, or pass --data-dir.")
    )]
    Persistence { message: String, data_dir: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(dexsync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(dexsync::config),
        help("Inspect the resolved configuration with: dexsync config show")
    )]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(dexsync::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(dexsync::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render output: {0}")]
    #[diagnostic(code(dexsync::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Remote { .. } => exit_code::CONNECTION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// A catalog entry that does not exist.
    pub fn entry_not_found(id: u32) -> Self {
        Self::NotFound {
            resource_type: "catalog entry".into(),
            identifier: id.to_string(),
            list_command: "catalog list".into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Remote { message, .. } => CliError::Remote {
                message,
                url: "the configured base URL".into(),
            },
            CoreError::NotFound { id } => CliError::entry_not_found(id),
            CoreError::Persistence { key, message } => CliError::Persistence {
                message: format!("Failed to persist '{key}': {message}"),
                data_dir: "the data directory".into(),
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(
            CliError::from(CoreError::NotFound { id: 9 }).exit_code(),
            exit_code::NOT_FOUND
        );
        assert_eq!(
            CliError::from(CoreError::Remote {
                message: "down".into(),
                transient: true
            })
            .exit_code(),
            exit_code::CONNECTION
        );
        assert_eq!(
            CliError::NonInteractiveRequiresYes {
                action: "clear".into()
            }
            .exit_code(),
            exit_code::USAGE
        );
    }
}
