//! Watch command handler: runs the engine's background tasks and reports
//! connectivity and sync changes until interrupted.

use std::future;

use dexsync_core::Engine;

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(engine: &Engine, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let mut connectivity = engine.connectivity().subscribe();
    let mut favorites = engine.favorites().subscribe();

    engine.start().await;
    let initial = engine.connectivity().state();
    let mut online = initial.is_online;
    let mut pending = engine.favorites().pending_actions().len();
    let mut last_sync = engine.favorites().last_sync_time();
    output::notice(
        &format!(
            "Watching {} every {}s: {}, {pending} pending change(s)",
            engine.config().base_url,
            engine.config().connectivity_interval.as_secs(),
            output::online_label(online, color),
        ),
        global.quiet,
    );

    let deadline = async {
        match args.duration {
            Some(d) => tokio::time::sleep(d).await,
            None => future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            () = &mut deadline => break,
            changed = connectivity.changed() => {
                if changed.is_err() {
                    break;
                }
                let now_online = connectivity.borrow_and_update().is_online;
                if now_online != online {
                    online = now_online;
                    output::notice(
                        &format!("Connectivity: {}", output::online_label(online, color)),
                        global.quiet,
                    );
                }
            }
            changed = favorites.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = favorites.borrow_and_update().clone();
                if state.last_sync_time != last_sync && state.last_sync_time.is_some() {
                    output::notice(
                        &format!(
                            "Synced {pending} change(s) at {}",
                            util::format_time(state.last_sync_time)
                        ),
                        global.quiet,
                    );
                }
                last_sync = state.last_sync_time;
                if state.pending_actions.len() != pending {
                    pending = state.pending_actions.len();
                    output::notice(&format!("{pending} pending change(s)"), global.quiet);
                }
                if let Some(error) = state.last_error {
                    output::notice(&format!("Error: {error}"), global.quiet);
                    engine.favorites().clear_error();
                }
            }
        }
    }

    engine.shutdown().await;
    output::notice("Stopped", global.quiet);
    Ok(())
}
