// ── Runtime configuration ──
//
// These types describe *how* to reach the catalog and where favorites
// live on disk. They never read files themselves: the CLI constructs a
// `ClientConfig` (usually via `dexsync-config`) and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use dexsync_api::{CatalogClient, RetryPolicy, TransportConfig};

use crate::error::CoreError;

/// Default interval between periodic connectivity probes.
pub const DEFAULT_CONNECTIVITY_INTERVAL: Duration = Duration::from_secs(30);

/// Default catalog page size.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Everything the data layer needs to run.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Catalog service base URL (e.g. `https://pokeapi.co/api/v2/`).
    pub base_url: Url,
    /// Base URL for sprite images.
    pub sprite_base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Extra attempts per failed request.
    pub max_retries: u32,
    /// Items fetched per page.
    pub page_size: u32,
    /// Entry fetched by the reachability probe.
    pub probe_id: u32,
    /// Interval between periodic connectivity probes.
    pub connectivity_interval: Duration,
    /// Directory holding the durable favorites keys.
    pub data_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(dexsync_api::DEFAULT_BASE_URL)
                .unwrap_or_else(|_| unreachable!("default base URL is valid")),
            sprite_base_url: dexsync_api::DEFAULT_SPRITE_BASE_URL.into(),
            timeout: dexsync_api::transport::DEFAULT_TIMEOUT,
            max_retries: RetryPolicy::default().max_retries,
            page_size: DEFAULT_PAGE_SIZE,
            probe_id: dexsync_api::DEFAULT_PROBE_ID,
            connectivity_interval: DEFAULT_CONNECTIVITY_INTERVAL,
            data_dir: PathBuf::from(".dexsync"),
        }
    }
}

impl ClientConfig {
    /// Build the catalog client described by this config.
    pub fn build_client(&self) -> Result<CatalogClient, CoreError> {
        let transport = TransportConfig::default().with_timeout(self.timeout);
        let client = CatalogClient::new(self.base_url.as_str(), &transport)?
            .with_retry(RetryPolicy {
                max_retries: self.max_retries,
            })
            .with_sprite_base_url(self.sprite_base_url.clone())
            .with_probe_id(self.probe_id);
        Ok(client)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_public_service() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.base_url.as_str(), "https://pokeapi.co/api/v2/");
        assert_eq!(cfg.page_size, 20);
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.connectivity_interval, Duration::from_secs(30));
    }

    #[test]
    fn build_client_applies_settings() {
        let cfg = ClientConfig {
            max_retries: 1,
            sprite_base_url: "https://img.example".into(),
            ..ClientConfig::default()
        };
        let client = cfg.build_client().unwrap();
        assert_eq!(client.retry_policy().attempts(), 2);
        assert_eq!(client.image_url(4), "https://img.example/4.png");
    }
}
