// Catalog HTTP client
//
// Wraps `reqwest::Client` with PokeAPI URL construction, per-request retry,
// and response decoding. Every public method is one logical request; the
// retry counter lives on the stack of that call and is never shared.

use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::Error;
use crate::models::{ListResponse, Page, PokemonDetail, ResourceRef};
use crate::transport::TransportConfig;

/// Public PokeAPI base URL.
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2/";

/// Sprite CDN used for image URLs.
pub const DEFAULT_SPRITE_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// Id fetched by [`CatalogClient::probe`]. Entry #1 always exists.
pub const DEFAULT_PROBE_ID: u32 = 1;

/// Bounded immediate-resubmission policy.
///
/// A failed request is resubmitted up to `max_retries` more times with no
/// delay in between. Permanent failures (404, undecodable payloads) are
/// surfaced on the first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

impl RetryPolicy {
    /// Never resubmit.
    pub const NONE: Self = Self { max_retries: 0 };

    /// Total attempts for one logical request.
    pub fn attempts(self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Async client for the catalog service.
///
/// Stateless apart from configuration: safe to share behind an `Arc` and
/// call concurrently.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: Url,
    sprite_base_url: String,
    probe_id: u32,
    retry: RetryPolicy,
}

impl CatalogClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `base_url` using the given transport settings.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            sprite_base_url: DEFAULT_SPRITE_BASE_URL.to_owned(),
            probe_id: DEFAULT_PROBE_ID,
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the sprite base used by [`image_url`](Self::image_url).
    pub fn with_sprite_base_url(mut self, sprite_base_url: impl Into<String>) -> Self {
        self.sprite_base_url = sprite_base_url.into();
        self
    }

    /// Replace the id fetched by [`probe`](Self::probe).
    pub fn with_probe_id(mut self, probe_id: u32) -> Self {
        self.probe_id = probe_id;
        self
    }

    /// Ensure the base path ends with `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The normalized catalog base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The active retry policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch one page of the catalog.
    ///
    /// `GET /pokemon?limit={limit}&offset={offset}`
    ///
    /// Ids are derived from each entry's resource URL; the list endpoint
    /// does not return them directly.
    pub async fn list_page(&self, limit: u32, offset: usize) -> Result<Page<ResourceRef>, Error> {
        let url = self.url("pokemon")?;
        debug!(limit, offset, "listing catalog page");
        let params = [("limit", limit.to_string()), ("offset", offset.to_string())];

        let body = self.get_with_retry(&url, &params).await?;
        let raw: ListResponse = decode(body)?;

        let items = raw
            .results
            .into_iter()
            .map(ResourceRef::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            has_next: raw.next.is_some(),
        })
    }

    /// Fetch the detail record for one entry.
    ///
    /// `GET /pokemon/{id}`. A 404 surfaces immediately as
    /// [`Error::NotFound`].
    pub async fn fetch_detail(&self, id: u32) -> Result<PokemonDetail, Error> {
        let url = self.url(&format!("pokemon/{id}"))?;
        debug!(id, "fetching catalog detail");

        match self.get_with_retry(&url, &[]).await {
            Ok(body) => decode(body),
            Err(e) if e.is_not_found() => Err(Error::NotFound { id }),
            Err(e) => Err(e),
        }
    }

    /// Reachability check: fetch a known-good entry.
    ///
    /// Returns `true` iff the request eventually succeeds. Never fails;
    /// every error is folded into `false`.
    pub async fn probe(&self) -> bool {
        let url = match self.url(&format!("pokemon/{}", self.probe_id)) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "probe URL could not be built");
                return false;
            }
        };

        match self.get_with_retry(&url, &[]).await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "probe failed");
                false
            }
        }
    }

    /// Sprite URL for an entry. Pure string template; no network.
    pub fn image_url(&self, id: u32) -> String {
        format!("{}/{id}.png", self.sprite_base_url.trim_end_matches('/'))
    }

    // ── Transport mechanics ──────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// GET with bounded immediate retry, returning the response body.
    ///
    /// Non-transient failures (404) short-circuit the loop.
    async fn get_with_retry(&self, url: &Url, params: &[(&str, String)]) -> Result<String, Error> {
        let attempts = self.retry.attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            trace!(%url, attempt, "GET");

            let err = match self.send_once(url, params).await {
                Ok(body) => return Ok(body),
                Err(e) => e,
            };

            if !err.is_transient() {
                return Err(err);
            }
            if attempt >= attempts {
                return Err(if attempt == 1 {
                    err
                } else {
                    Error::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    }
                });
            }

            warn!(%url, attempt, max_attempts = attempts, error = %err, "retrying request");
        }
    }

    async fn send_once(&self, url: &Url, params: &[(&str, String)]) -> Result<String, Error> {
        let resp = self.http.get(url.clone()).query(params).send().await?;
        let status = resp.status();

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(resp.text().await?)
    }
}

fn decode<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}
