//! CLI-side configuration: the shared TOML config plus global flag
//! overrides, translated to `dexsync_core::ClientConfig`.
//!
//! Core never sees these types -- it receives a pre-built `ClientConfig`.

use std::time::Duration;

use dexsync_config::Config;
use dexsync_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load the config file (or defaults) and apply flag overrides.
pub fn resolve(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let mut cfg = dexsync_config::load_config()?;
    apply_overrides(&mut cfg, global);
    Ok(cfg.to_client_config()?)
}

/// Flags beat environment, which beats the file, which beats defaults.
pub fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref url) = global.base_url {
        cfg.catalog.base_url.clone_from(url);
    }
    if let Some(ref dir) = global.data_dir {
        cfg.sync.data_dir = Some(dir.clone());
    }
    if let Some(secs) = global.timeout {
        cfg.catalog.timeout = secs;
    }
}

/// Override the connectivity interval for long-running commands.
pub fn with_interval(mut cfg: ClientConfig, secs: Option<u64>) -> Result<ClientConfig, CliError> {
    if let Some(secs) = secs {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        cfg.connectivity_interval = Duration::from_secs(secs);
    }
    Ok(cfg)
}
