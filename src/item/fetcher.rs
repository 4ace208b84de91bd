//! Item API fetcher
//!
//! Resolves a raw identifier to a full [`Item`] through the public JSON API.
//! Requests are paced by a fixed delay, and a failed lookup never aborts the
//! run: the caller always gets a record back, real or placeholder.

use crate::config::ApiConfig;
use crate::item::Item;
use crate::HarvestError;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a single item request failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid item URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("item does not exist")]
    Missing,

    #[error("malformed item payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Timeouts, connection failures, 5xx and 429 are worth retrying
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::Status(code) => {
                *code == StatusCode::TOO_MANY_REQUESTS.as_u16() || *code >= 500
            }
            _ => false,
        }
    }
}

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Wait before retry number `attempt` (0-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(1u32 << attempt.min(16))
    }
}

/// Fetches items from the JSON API, one at a time
pub struct ItemFetcher {
    client: Client,
    api_base: Url,
    delay: Duration,
    retry: RetryPolicy,
}

/// Builds the HTTP client used for API requests
///
/// The API needs no cookies, so it gets its own client rather than the
/// logged-in site session.
pub fn build_api_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(format!("hn-harvest/{}", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

impl ItemFetcher {
    /// Creates a fetcher from API settings
    pub fn new(config: &ApiConfig) -> Result<Self, HarvestError> {
        let client = build_api_client(config)?;
        let api_base = Url::parse(&config.base_url)?;
        Ok(Self {
            client,
            api_base,
            delay: Duration::from_millis(config.request_delay_ms),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                backoff: Duration::from_millis(config.retry_backoff_ms),
            },
        })
    }

    /// API location of an item
    pub fn item_url(&self, id: &str) -> Result<Url, url::ParseError> {
        self.api_base.join(&format!("item/{}.json", id))
    }

    /// Fetches one item, returning a placeholder if it cannot be retrieved
    ///
    /// Sleeps for the configured delay before the first request. Transient
    /// failures are retried according to the retry policy; anything else, or
    /// running out of retries, yields [`Item::placeholder`].
    pub async fn fetch(&self, id: &str) -> Item {
        tokio::time::sleep(self.delay).await;

        let mut attempt = 0;
        loop {
            match self.try_fetch(id).await {
                Ok(item) => return item,
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    let wait = self.retry.backoff_for(attempt);
                    tracing::debug!(
                        "Item {} failed ({}), retrying in {:?} ({}/{})",
                        id,
                        e,
                        wait,
                        attempt + 1,
                        self.retry.max_retries
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!("Item {} could not be retrieved: {}", id, e);
                    return Item::placeholder(id);
                }
            }
        }
    }

    async fn try_fetch(&self, id: &str) -> Result<Item, FetchError> {
        let url = self.item_url(id)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let mut payload: Value = serde_json::from_str(&body)?;

        if payload.is_null() {
            return Err(FetchError::Missing);
        }
        if let Some(fields) = payload.as_object_mut() {
            fields.remove("kids");
        }

        Ok(serde_json::from_value(payload)?)
    }
}
