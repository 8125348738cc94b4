//! Dealer site modules: HTTP client, page parsers, normalization, and data models.

pub mod client;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod selectors;

pub use client::{DealerClient, DealerFetch, FetchError};
pub use models::{Slot, VehicleDraft, VehicleRecord};
pub use normalize::{ModelSplitter, NameParts, TitleCleaner};
pub use parser::{DetailParser, ListingParser};
