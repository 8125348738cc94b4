//! Single vehicle lookup command implementation.

use crate::config::Config;
use crate::dealer::{DealerClient, DealerFetch, DetailParser, VehicleRecord};
use crate::format::Formatter;
use anyhow::{Context, Result};
use tracing::warn;

/// Extracts vehicles from detail page URLs given on the command line.
pub struct DetailCommand {
    config: Config,
}

impl DetailCommand {
    /// Creates a new detail command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Fetches the pages and returns formatted output.
    pub async fn execute(&self, urls: &[String]) -> Result<String> {
        let client = DealerClient::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_client(&client, urls).await
    }

    /// Fetches the pages with a provided client (for testing).
    ///
    /// A single URL reports its failure; with several, failing pages are skipped.
    pub async fn execute_with_client(
        &self,
        client: &impl DealerFetch,
        urls: &[String],
    ) -> Result<String> {
        let parser = DetailParser::with_base_url(&self.config, client.base_url())?;
        let formatter = Formatter::new(self.config.format);

        if let [url] = urls {
            let vehicle = fetch_vehicle(client, &parser, url).await?;
            return Ok(formatter.format_vehicle(&vehicle));
        }

        let mut vehicles = Vec::new();
        for url in urls {
            match fetch_vehicle(client, &parser, url).await {
                Ok(vehicle) => vehicles.push(vehicle),
                Err(e) => warn!("Skipping {}: {:#}", url, e),
            }
        }

        Ok(formatter.format_vehicles(&vehicles))
    }
}

async fn fetch_vehicle(
    client: &impl DealerFetch,
    parser: &DetailParser,
    url: &str,
) -> Result<VehicleRecord> {
    let html = client.detail(url).await?;
    parser.parse(&html, url)
}
