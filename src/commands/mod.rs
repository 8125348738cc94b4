//! CLI command implementations.

pub mod detail;
pub mod links;
pub mod scrape;

pub use detail::DetailCommand;
pub use links::{collect_links, LinksCommand};
pub use scrape::ScrapeCommand;
