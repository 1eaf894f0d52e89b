//! Status command handler.

use chrono::{DateTime, Utc};
use serde::Serialize;

use dexsync_core::Engine;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct StatusReport {
    base_url: String,
    online: bool,
    last_checked_at: Option<DateTime<Utc>>,
    favorites: usize,
    pending_actions: usize,
    last_sync_time: Option<DateTime<Utc>>,
    data_dir: String,
}

fn detail(r: &StatusReport, color: bool) -> String {
    [
        format!("Catalog:      {}", r.base_url),
        format!("Connectivity: {}", output::online_label(r.online, color)),
        format!("Checked:      {}", util::format_time(r.last_checked_at)),
        format!("Favorites:    {}", r.favorites),
        format!("Pending:      {}", r.pending_actions),
        format!("Last sync:    {}", util::format_time(r.last_sync_time)),
        format!("Data dir:     {}", r.data_dir),
    ]
    .join("\n")
}

pub async fn handle(engine: &Engine, global: &GlobalOpts) -> Result<(), CliError> {
    let favorites = engine.favorites();
    let monitor = engine.connectivity();
    tokio::join!(favorites.load(), monitor.check_now());

    let connectivity = monitor.state();
    let state = favorites.state();
    let report = StatusReport {
        base_url: engine.config().base_url.to_string(),
        online: connectivity.is_online,
        last_checked_at: connectivity.last_checked_at,
        favorites: state.favorites.len(),
        pending_actions: state.pending_actions.len(),
        last_sync_time: state.last_sync_time,
        data_dir: engine.config().data_dir.display().to_string(),
    };

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &report,
        |r| detail(r, color),
        |r| output::online_label(r.online, false),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
