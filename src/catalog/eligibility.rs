//! Feed eligibility filtering and optional prioritization.
//!
//! Both functions are pure and order-stable; filtering an already
//! filtered list is a no-op.

use super::types::Product;

/// Tags that exclude a product from merchant feeds. Matched against
/// trimmed, lowercased tags.
const EXCLUDED_TAGS: [&str; 4] = ["hidden", "internal", "draft", "test"];

/// Returns the products eligible for feed inclusion, preserving order.
///
/// A product is dropped when it has no variants, no images, or carries
/// any exclusion tag (case-insensitive, surrounding whitespace ignored).
pub fn filter_feed_eligible(products: Vec<Product>) -> Vec<Product> {
    let before = products.len();
    let eligible: Vec<Product> = products.into_iter().filter(is_feed_eligible).collect();

    let dropped = before - eligible.len();
    if dropped > 0 {
        tracing::debug!(
            eligible = eligible.len(),
            dropped = dropped,
            "Filtered feed-ineligible products"
        );
    }

    eligible
}

fn is_feed_eligible(product: &Product) -> bool {
    if product.variants.is_empty() || product.images.is_empty() {
        return false;
    }

    !product.tags.iter().any(|tag| {
        let normalized = tag.trim().to_lowercase();
        EXCLUDED_TAGS.contains(&normalized.as_str())
    })
}

/// Reorders products so the richest, freshest listings come first:
/// descending variant count, ties broken by descending `updated_at`.
///
/// The sort is stable, so products tied on both keys keep their
/// original relative order. Products without `updated_at` sort after
/// dated ones within the same variant count.
pub fn prioritize_products(mut products: Vec<Product>) -> Vec<Product> {
    products.sort_by(|a, b| {
        b.variants
            .len()
            .cmp(&a.variants.len())
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
    products
}
