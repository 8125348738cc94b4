//! Listing collection command implementation.

use crate::config::Config;
use crate::dealer::{DealerClient, DealerFetch, ListingParser};
use crate::format::Formatter;
use anyhow::{Context, Result};
use tracing::{error, info};

/// Fetches the stock listing and returns the sorted detail-page URLs.
///
/// A listing page that cannot be fetched yields an empty list; only an
/// unusable base URL is an error.
pub async fn collect_links(config: &Config, client: &impl DealerFetch) -> Result<Vec<String>> {
    let parser = ListingParser::with_base_url(config, client.base_url())?;

    let html = match client.listing().await {
        Ok(html) => html,
        Err(e) => {
            error!("Error during stock list processing: {:#}", e);
            return Ok(Vec::new());
        }
    };

    Ok(parser.parse(&html))
}

/// Lists vehicle detail URLs without fetching them.
pub struct LinksCommand {
    config: Config,
}

impl LinksCommand {
    /// Creates a new links command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Collects the links and returns formatted output.
    pub async fn execute(&self) -> Result<String> {
        let client = DealerClient::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_client(&client).await
    }

    /// Collects the links with a provided client (for testing).
    pub async fn execute_with_client(&self, client: &impl DealerFetch) -> Result<String> {
        let links = collect_links(&self.config, client).await?;
        info!("Collected {} vehicle links", links.len());

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_links(&links))
    }
}
