//! Command dispatch: bridges CLI args -> engine operations -> output formatting.

pub mod catalog;
pub mod config_cmd;
pub mod favorites;
pub mod status;
pub mod util;
pub mod watch;

use dexsync_core::Engine;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an engine-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, engine: &Engine, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Catalog(args) => catalog::handle(engine, args, global).await,
        Command::Favorites(args) => favorites::handle(engine, args, global).await,
        Command::Status => status::handle(engine, global).await,
        Command::Watch(args) => watch::handle(engine, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions do not run against the engine".into(),
        )),
    }
}
