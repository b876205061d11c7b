//! Feedmill: merchant-feed generation over an upstream product catalog.
//!
//! The pipeline is catalog fetch → eligibility filter → prioritize →
//! batch/stream XML items, exposed over HTTP as one streaming document
//! (`/feed.xml`) or as buffered pages with a sitemap-style index.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod feed;
pub mod server;
pub mod util;
