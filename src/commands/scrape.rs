//! Full stock scrape: listing, every detail page, JSON file.

use crate::commands::links::collect_links;
use crate::config::Config;
use crate::dealer::{DealerClient, DealerFetch, DetailParser, VehicleRecord};
use crate::format::write_json_file;
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

/// Scrapes the whole stock and writes it to the configured output file.
pub struct ScrapeCommand {
    config: Config,
}

impl ScrapeCommand {
    /// Creates a new scrape command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the scrape and returns the vehicles written.
    pub async fn execute(&self) -> Result<Vec<VehicleRecord>> {
        let client = DealerClient::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_client(&client).await
    }

    /// Runs the scrape with a provided client (for testing).
    ///
    /// Detail pages are processed one at a time in sorted URL order. A page
    /// that cannot be fetched or parsed is skipped. The output file is only
    /// written when at least one vehicle was scraped.
    pub async fn execute_with_client(&self, client: &impl DealerFetch) -> Result<Vec<VehicleRecord>> {
        let urls = collect_links(&self.config, client).await?;
        if urls.is_empty() {
            warn!("No vehicle detail URLs found. Exiting.");
            return Ok(Vec::new());
        }

        let parser = DetailParser::with_base_url(&self.config, client.base_url())?;

        let total = self.config.max_vehicles.map_or(urls.len(), |max| urls.len().min(max));
        if total < urls.len() {
            info!("Limiting run to {} of {} vehicles", total, urls.len());
        }

        let mut vehicles = Vec::with_capacity(total);
        for (i, url) in urls.iter().take(total).enumerate() {
            info!("Processing vehicle {}/{}: {}", i + 1, total, url);

            let html = match client.detail(url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Failed to fetch {}: {:#}", url, e);
                    continue;
                }
            };

            match parser.parse(&html, url) {
                Ok(vehicle) => vehicles.push(vehicle),
                Err(e) => warn!("Failed to parse {}: {:#}", url, e),
            }
        }

        if vehicles.is_empty() {
            warn!("No data was scraped.");
            return Ok(vehicles);
        }

        let without_year = vehicles.iter().filter(|v| !v.has_year()).count();
        if without_year > 0 {
            debug!("{} vehicles have no model year", without_year);
        }

        write_json_file(&self.config.output, &vehicles)?;
        info!("Scraping complete. Data saved to {}", self.config.output.display());
        info!("Total vehicles scraped: {}", vehicles.len());

        Ok(vehicles)
    }
}
