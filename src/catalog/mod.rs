//! Upstream product catalog: fetching, eligibility, and prioritization.

mod client;
mod eligibility;
mod types;

pub use client::{CatalogClient, CatalogError, DEFAULT_BULK_PAGE_SIZE, MAX_PAGE_LIMIT};
pub use eligibility::{filter_feed_eligible, prioritize_products};
pub use types::{Image, Product, ProductPage, Variant};
