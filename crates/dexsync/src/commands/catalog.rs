//! Catalog command handlers.

use std::sync::Arc;

use tabled::Tabled;

use dexsync_core::{CatalogItemDetail, CatalogItemSummary, Engine};

use crate::cli::{CatalogArgs, CatalogCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CatalogRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Fav")]
    favorite: &'static str,
}

fn detail(d: &Arc<CatalogItemDetail>, favorite: bool) -> String {
    [
        format!("ID:        {}", d.id),
        format!("Name:      {}", d.name),
        format!("Types:     {}", d.types.join(", ")),
        format!("Abilities: {}", d.abilities.join(", ")),
        format!(
            "Image:     {}",
            d.primary_image_url.as_deref().unwrap_or("-")
        ),
        format!("Favorite:  {}", if favorite { "yes" } else { "no" }),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(engine: &Engine, args: CatalogArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let favorites = engine.favorites();
    favorites.load().await;

    match args.command {
        CatalogCommand::List { pages } => {
            let cache = engine.catalog();
            cache.refresh().await;
            if let Some(message) = cache.last_error() {
                return Err(util::remote_error(engine, message));
            }

            for _ in 1..pages {
                if !cache.cursor().has_more {
                    break;
                }
                cache.load_more().await;
                if let Some(message) = cache.last_error() {
                    return Err(util::remote_error(engine, message));
                }
            }

            let items: Vec<Arc<CatalogItemSummary>> = cache.items().iter().cloned().collect();
            let out = output::render_list(
                &global.output,
                &items,
                |i| CatalogRow {
                    id: i.id,
                    name: i.name.clone(),
                    favorite: if favorites.is_favorite(i.id) { "★" } else { "" },
                },
                |i| i.id.to_string(),
            );
            output::print_output(&out, global.quiet);

            let cursor = cache.cursor();
            if cursor.has_more {
                output::notice(
                    &format!(
                        "{} entries shown; fetch more with --pages {}",
                        cursor.offset,
                        pages + 1
                    ),
                    global.quiet,
                );
            }
            Ok(())
        }

        CatalogCommand::Show { id } => {
            let entry = engine.catalog().fetch_detail(id).await?;
            let favorite = favorites.is_favorite(id);
            let out = output::render_single(
                &global.output,
                &entry,
                |d| detail(d, favorite),
                |d| d.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
