//! price-scout - Heuristic product-listing extraction for Vietnamese shops
//!
//! Finds product cards on a rendered search page, pulls out title, link,
//! image and price, and keeps only what looks like a real listing.

pub mod commands;
pub mod config;
pub mod error;
pub mod filters;
pub mod format;
pub mod scrape;
pub mod store;

pub use config::Config;
pub use error::ScrapeError;
pub use scrape::{Engine, ProductRecord, Site, SiteProfile, Snapshot};
