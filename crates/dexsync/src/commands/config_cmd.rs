//! Config subcommand handlers.

use std::io::IsTerminal;
use std::path::PathBuf;

use dialoguer::Input;

use dexsync_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::apply_overrides;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Walk through the settings worth changing, starting from `cfg`.
fn prompt_settings(mut cfg: Config) -> Result<Config, CliError> {
    cfg.catalog.base_url = Input::new()
        .with_prompt("Catalog URL")
        .default(cfg.catalog.base_url)
        .interact_text()
        .map_err(prompt_err)?;

    cfg.catalog.page_size = Input::new()
        .with_prompt("Page size")
        .default(cfg.catalog.page_size)
        .validate_with(|n: &u32| if *n == 0 { Err("must be at least 1") } else { Ok(()) })
        .interact_text()
        .map_err(prompt_err)?;

    let default_dir = cfg
        .sync
        .data_dir
        .clone()
        .unwrap_or_else(dexsync_config::default_data_dir);
    let dir: String = Input::new()
        .with_prompt("Data directory")
        .default(default_dir.display().to_string())
        .interact_text()
        .map_err(prompt_err)?;
    let dir = PathBuf::from(dir);
    cfg.sync.data_dir = (dir != dexsync_config::default_data_dir()).then_some(dir);

    Ok(cfg)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => {
            let path = dexsync_config::config_path();
            if path.exists() {
                let message = format!("Overwrite {}?", path.display());
                if !util::confirm(&message, "config init", global.yes)? {
                    output::notice("Aborted", global.quiet);
                    return Ok(());
                }
            }

            let mut cfg = Config::default();
            apply_overrides(&mut cfg, global);
            if !global.yes {
                if !std::io::stdin().is_terminal() {
                    return Err(CliError::NonInteractiveRequiresYes {
                        action: "config init".into(),
                    });
                }
                cfg = prompt_settings(cfg)?;
            }
            cfg.to_client_config()?;

            let saved = dexsync_config::save_config(&cfg)?;
            output::notice(&format!("Config written to {}", saved.display()), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let mut cfg = dexsync_config::load_config()?;
            apply_overrides(&mut cfg, global);
            let text = toml::to_string_pretty(&cfg).map_err(|e| CliError::Render(e.to_string()))?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |_| text.trim_end().to_owned(),
                |c| c.catalog.base_url.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(
                &dexsync_config::config_path().display().to_string(),
                global.quiet,
            );
            Ok(())
        }
    }
}
