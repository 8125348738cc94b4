//! HTTP client for the dealer site using wreq for browser emulation.

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use wreq::Client;
use wreq_util::Emulation;

/// A page that could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GET {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("GET {url} failed")]
    Transport {
        url: String,
        #[source]
        source: wreq::Error,
    },

    #[error("Failed to read response body from {url}")]
    Body {
        url: String,
        #[source]
        source: wreq::Error,
    },
}

/// Page fetching seam, mocked in tests.
#[async_trait]
pub trait DealerFetch: Send + Sync {
    /// Fetches the stock listing page.
    async fn listing(&self) -> Result<String>;

    /// Fetches a vehicle detail page by absolute URL.
    async fn detail(&self, url: &str) -> Result<String>;

    /// Returns the site origin relative links resolve against.
    fn base_url(&self) -> &str;
}

/// Dealer site HTTP client.
pub struct DealerClient {
    client: Client,
    base_url: String,
    listing_path: String,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl DealerClient {
    /// Creates a client for the configured site.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, None)
    }

    /// Creates a client with an optional base URL override (for testing).
    pub fn with_base_url(config: &Config, base_url: Option<String>) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| config.base_url.clone()),
            listing_path: config.listing_path.clone(),
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
        })
    }

    fn listing_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.listing_path)
    }

    async fn get(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8")
            .header("Accept-Language", "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .map_err(|source| FetchError::Transport { url: url.to_string(), source })?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            if status.as_u16() == 429 || status.as_u16() == 503 {
                warn!("Throttled ({}). Consider increasing --delay.", status);
            }
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() }.into());
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Body { url: url.to_string(), source })?;

        Ok(body)
    }

    /// Waits the configured delay plus a random jitter.
    async fn delay(&self) {
        if self.delay_ms == 0 && self.delay_jitter_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl DealerFetch for DealerClient {
    async fn listing(&self) -> Result<String> {
        let url = self.listing_url();
        info!("Fetching stock listing: {}", url);
        self.get(&url).await
    }

    /// Every detail request is followed by the delay, whether it succeeded or not.
    async fn detail(&self, url: &str) -> Result<String> {
        info!("Fetching details from: {}", url);
        let result = self.get(url).await;
        self.delay().await;
        result
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
