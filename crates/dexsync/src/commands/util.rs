//! Shared helpers for command handlers.

use std::io::IsTerminal;

use dexsync_core::Engine;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// A failure recorded by the catalog cache.
pub fn remote_error(engine: &Engine, message: String) -> CliError {
    CliError::Remote {
        message,
        url: engine.config().base_url.to_string(),
    }
}

/// Surface a failure recorded by the favorites store, if any.
pub fn check_favorites(engine: &Engine) -> Result<(), CliError> {
    match engine.favorites().last_error() {
        Some(message) => Err(CliError::Persistence {
            message,
            data_dir: engine.config().data_dir.display().to_string(),
        }),
        None => Ok(()),
    }
}

/// Render an optional timestamp for tables.
pub fn format_time(ts: Option<chrono::DateTime<chrono::Utc>>) -> String {
    ts.map_or_else(
        || "-".into(),
        |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}
