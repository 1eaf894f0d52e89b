//! Shared configuration for the dexsync CLI.
//!
//! A TOML file (catalog endpoint, retry and paging knobs, sync settings)
//! merged with `DEXSYNC_`-prefixed environment variables, and translation
//! to `dexsync_core::ClientConfig`. Core never reads configuration itself.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dexsync_core::ClientConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Output defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Remote catalog settings.
    #[serde(default)]
    pub catalog: CatalogSettings,

    /// Favorites persistence and connectivity settings.
    #[serde(default)]
    pub sync: SyncSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogSettings {
    /// Catalog service base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Base URL for sprite images; `{id}.png` is appended.
    #[serde(default = "default_sprite_base_url")]
    pub sprite_base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Extra attempts after a failed request.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Entries fetched per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Entry fetched to test reachability.
    #[serde(default = "default_probe_id")]
    pub probe_id: u32,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            sprite_base_url: default_sprite_base_url(),
            timeout: default_timeout(),
            max_retries: default_max_retries(),
            page_size: default_page_size(),
            probe_id: default_probe_id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SyncSettings {
    /// Seconds between periodic connectivity checks.
    #[serde(default = "default_connectivity_interval")]
    pub connectivity_interval: u64,

    /// Where favorites are stored. Defaults to the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            connectivity_interval: default_connectivity_interval(),
            data_dir: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_base_url() -> String {
    dexsync_core::ClientConfig::default().base_url.to_string()
}
fn default_sprite_base_url() -> String {
    dexsync_core::ClientConfig::default().sprite_base_url
}
fn default_timeout() -> u64 {
    10
}
fn default_max_retries() -> u32 {
    3
}
fn default_page_size() -> u32 {
    dexsync_core::DEFAULT_PAGE_SIZE
}
fn default_probe_id() -> u32 {
    1
}
fn default_connectivity_interval() -> u64 {
    dexsync_core::DEFAULT_CONNECTIVITY_INTERVAL.as_secs()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "dexsync", "dexsync")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default directory for persisted favorites.
pub fn default_data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("dexsync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + environment.
///
/// Environment variables use `__` between section and key, e.g.
/// `DEXSYNC_CATALOG__PAGE_SIZE=50`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("DEXSYNC_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Build the runtime config core consumes.
    pub fn to_client_config(&self) -> Result<ClientConfig, ConfigError> {
        let catalog = &self.catalog;
        let base_url: url::Url =
            catalog
                .base_url
                .parse()
                .map_err(|e: url::ParseError| ConfigError::Validation {
                    field: "catalog.base_url".into(),
                    reason: format!("invalid URL '{}': {e}", catalog.base_url),
                })?;

        if catalog.page_size == 0 {
            return Err(ConfigError::Validation {
                field: "catalog.page_size".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.sync.connectivity_interval == 0 {
            return Err(ConfigError::Validation {
                field: "sync.connectivity_interval".into(),
                reason: "must be at least 1 second".into(),
            });
        }

        Ok(ClientConfig {
            base_url,
            sprite_base_url: catalog.sprite_base_url.clone(),
            timeout: Duration::from_secs(catalog.timeout),
            max_retries: catalog.max_retries,
            page_size: catalog.page_size,
            probe_id: catalog.probe_id,
            connectivity_interval: Duration::from_secs(self.sync.connectivity_interval),
            data_dir: self.sync.data_dir.clone().unwrap_or_else(default_data_dir),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_translate_to_client_defaults() {
        let client = Config::default().to_client_config().unwrap();
        let reference = ClientConfig::default();
        assert_eq!(client.base_url, reference.base_url);
        assert_eq!(client.sprite_base_url, reference.sprite_base_url);
        assert_eq!(client.timeout, Duration::from_secs(10));
        assert_eq!(client.max_retries, 3);
        assert_eq!(client.page_size, 20);
        assert_eq!(client.probe_id, 1);
        assert_eq!(client.connectivity_interval, Duration::from_secs(30));
    }

    #[test]
    fn missing_file_loads_defaults() {
        Jail::expect_with(|_jail| {
            let cfg = load_config_from(Path::new("absent.toml")).unwrap();
            assert_eq!(cfg, Config::default());
            Ok(())
        });
    }

    #[test]
    fn file_and_env_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [catalog]
                base_url = "http://localhost:8080/api/v2/"
                page_size = 10

                [sync]
                data_dir = "/var/lib/dexsync"
                "#,
            )?;
            jail.set_env("DEXSYNC_CATALOG__PAGE_SIZE", "50");
            jail.set_env("DEXSYNC_SYNC__CONNECTIVITY_INTERVAL", "5");

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.catalog.base_url, "http://localhost:8080/api/v2/");
            assert_eq!(cfg.catalog.page_size, 50);
            assert_eq!(cfg.catalog.max_retries, 3);
            assert_eq!(cfg.sync.connectivity_interval, 5);

            let client = cfg.to_client_config().unwrap();
            assert_eq!(client.data_dir, PathBuf::from("/var/lib/dexsync"));
            assert_eq!(client.connectivity_interval, Duration::from_secs(5));
            Ok(())
        });
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut cfg = Config::default();
        cfg.catalog.base_url = "not a url".into();
        assert!(matches!(
            cfg.to_client_config(),
            Err(ConfigError::Validation { field, .. }) if field == "catalog.base_url"
        ));

        let mut cfg = Config::default();
        cfg.catalog.page_size = 0;
        assert!(cfg.to_client_config().is_err());
    }

    #[test]
    fn save_then_load_round_trips_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        let mut cfg = Config::default();
        cfg.catalog.max_retries = 1;
        cfg.sync.data_dir = Some(dir.path().join("data"));

        save_config_to(&cfg, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("max_retries = 1"));

        let loaded: Config = toml::from_str(&text).unwrap();
        assert_eq!(loaded, cfg);
    }
}
