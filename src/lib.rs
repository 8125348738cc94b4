//! eurocar-scraper - Stock scraper for the Eurocar Multimarcas dealership
//!
//! Collects vehicle detail links from the stock listing page, extracts each
//! vehicle into a flat record, and saves the result as a JSON file.

pub mod commands;
pub mod config;
pub mod dealer;
pub mod format;

pub use config::Config;
pub use dealer::{DealerClient, DealerFetch, FetchError, VehicleRecord};
