//! Deserialization types for the upstream product catalog API.
//!
//! The upstream serves `GET /products.json?page=N&limit=M` pages shaped as
//! `{ "products": [...] }`. These types are read-only mirrors of that
//! payload; nothing here is ever written back.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One page of the upstream product listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// A catalog product as served by the upstream API.
///
/// Fields the feed does not need are left out; serde ignores unknown
/// keys by default, so payload growth upstream is harmless.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: u64,
    pub handle: String,
    pub title: String,
    /// Raw HTML description; stripped to text during formatting.
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A product image. Ordering is meaningful: the first image is the
/// primary one used for `image_link`.
#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub src: String,
}

/// A purchasable variant. Each variant yields one feed item.
#[derive(Debug, Clone, Deserialize)]
pub struct Variant {
    pub id: u64,
    #[serde(default)]
    pub sku: Option<String>,
    /// Option values joined by the upstream (e.g. "Blue / XL").
    #[serde(default)]
    pub title: Option<String>,
    /// Decimal price as a string, e.g. "19.99". Absent on malformed
    /// records; the formatter skips those with a recorded error.
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

impl Product {
    /// Primary image URL, if the product has any image at all.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(|i| i.src.as_str())
    }
}
