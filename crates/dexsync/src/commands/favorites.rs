//! Favorites command handlers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use dexsync_core::{
    Engine, FavoriteEntry, FavoriteInput, PendingSyncAction, SyncOutcome,
};

use crate::cli::{FavoritesArgs, FavoritesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct FavoriteRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Added")]
    added_at: String,
    #[tabled(rename = "Image")]
    image: String,
}

impl From<&FavoriteEntry> for FavoriteRow {
    fn from(f: &FavoriteEntry) -> Self {
        Self {
            id: f.id,
            name: f.name.clone(),
            added_at: util::format_time(Some(f.added_at)),
            image: f.image_url.clone(),
        }
    }
}

#[derive(Tabled)]
struct PendingRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Queued")]
    timestamp: String,
}

impl From<&PendingSyncAction> for PendingRow {
    fn from(a: &PendingSyncAction) -> Self {
        Self {
            action: a.kind.to_string(),
            id: a.entry.id,
            name: a.entry.name.clone(),
            timestamp: util::format_time(Some(a.timestamp)),
        }
    }
}

/// Result of `favorites sync`, for structured output.
#[derive(Serialize)]
struct SyncReport {
    #[serde(flatten)]
    outcome: SyncOutcome,
    pending: usize,
    last_sync_time: Option<DateTime<Utc>>,
}

fn sync_detail(r: &SyncReport) -> String {
    match r.outcome {
        SyncOutcome::Skipped => "Nothing to sync".into(),
        SyncOutcome::Offline => format!(
            "Catalog unreachable; {} change(s) kept for the next sync",
            r.pending
        ),
        SyncOutcome::Reconciled { actions } => format!(
            "Synced {actions} change(s) at {}",
            util::format_time(r.last_sync_time)
        ),
        SyncOutcome::Failed => "Sync failed".into(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    engine: &Engine,
    args: FavoritesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let favorites = engine.favorites();
    favorites.load().await;

    match args.command {
        FavoritesCommand::List => {
            let entries = favorites.favorites();
            let out = output::render_list(
                &global.output,
                &entries,
                |f| FavoriteRow::from(f),
                |f| f.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FavoritesCommand::Add { id, name } => {
            if favorites.is_favorite(id) {
                output::notice(&format!("#{id} is already a favorite"), global.quiet);
                return Ok(());
            }
            let name = match name {
                Some(name) => name,
                None => engine.catalog().fetch_detail(id).await?.name.clone(),
            };
            favorites.add(FavoriteInput::new(id, name.as_str())).await;
            util::check_favorites(engine)?;
            output::notice(
                &format!(
                    "Added #{id} {name} to favorites ({} pending)",
                    favorites.pending_actions().len()
                ),
                global.quiet,
            );
            Ok(())
        }

        FavoritesCommand::Remove { id } => {
            if !favorites.is_favorite(id) {
                return Err(CliError::NotFound {
                    resource_type: "favorite".into(),
                    identifier: id.to_string(),
                    list_command: "favorites list".into(),
                });
            }
            favorites.remove(id).await;
            util::check_favorites(engine)?;
            output::notice(
                &format!(
                    "Removed #{id} from favorites ({} pending)",
                    favorites.pending_actions().len()
                ),
                global.quiet,
            );
            Ok(())
        }

        FavoritesCommand::Sync => {
            let outcome = favorites.sync().await;
            if outcome == SyncOutcome::Failed {
                util::check_favorites(engine)?;
            }
            let report = SyncReport {
                outcome,
                pending: favorites.pending_actions().len(),
                last_sync_time: favorites.last_sync_time(),
            };
            let out = output::render_single(&global.output, &report, sync_detail, |r| {
                r.pending.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FavoritesCommand::Pending => {
            let actions = favorites.pending_actions();
            let out = output::render_list(
                &global.output,
                &actions,
                |a| PendingRow::from(a),
                |a| format!("{} {}", a.kind, a.entry.id),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FavoritesCommand::Clear => {
            let count = favorites.favorites().len();
            let pending = favorites.pending_actions().len();
            if !util::confirm(
                &format!("Forget {count} favorite(s) and {pending} pending change(s)?"),
                "favorites clear",
                global.yes,
            )? {
                return Ok(());
            }
            favorites.clear().await;
            util::check_favorites(engine)?;
            output::notice("Favorites cleared", global.quiet);
            Ok(())
        }
    }
}
