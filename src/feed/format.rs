//! Feed item formatting: one merchant-feed `<item>` per product variant.
//!
//! Formatting is infallible at the product level: a variant missing its
//! required fields is skipped and recorded as an error string, never a
//! panic or an abort of the surrounding batch.

use quick_xml::escape::escape;
use std::fmt::Write as _;
use thiserror::Error;

use crate::catalog::{Product, Variant};
use crate::feed::publisher::Publisher;
use crate::util::{collapse_whitespace, strip_html_tags, truncate_chars};

/// Merchant Center caps descriptions at 5000 characters.
const DESCRIPTION_MAX_CHARS: usize = 5000;

/// Site-level context threaded through item formatting.
#[derive(Debug, Clone)]
pub struct FeedContext {
    /// Public storefront base URL (no trailing slash) for item links.
    pub site_url: String,
    /// Channel title; also the brand fallback when a product has no vendor.
    pub site_name: String,
    /// Optional CDN base prepended to relative image paths.
    pub image_base_url: Option<String>,
    /// ISO 4217 code appended to prices.
    pub currency: String,
}

/// Why a single variant could not be rendered. Converted to strings and
/// aggregated; these never cross the module boundary as failures.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("product {product_id} variant {variant_id}: missing price")]
    MissingPrice { product_id: u64, variant_id: u64 },
    #[error("product {product_id} variant {variant_id}: unparseable price {price:?}")]
    InvalidPrice {
        product_id: u64,
        variant_id: u64,
        price: String,
    },
    #[error("product {product_id} variant {variant_id}: missing availability")]
    MissingAvailability { product_id: u64, variant_id: u64 },
    #[error("product {product_id}: no primary image")]
    MissingImage { product_id: u64 },
}

/// Items and per-variant errors produced from one product.
#[derive(Debug, Default)]
pub struct FormattedProduct {
    pub items: Vec<String>,
    pub errors: Vec<String>,
}

/// Formats every variant of `product` into publisher-namespaced XML
/// items. Variants with missing or unparseable required fields
/// contribute an error string instead of an item.
pub fn process_product_variants(
    product: &Product,
    publisher: Publisher,
    ctx: &FeedContext,
) -> FormattedProduct {
    let mut result = FormattedProduct::default();

    for variant in &product.variants {
        match format_variant_item(product, variant, publisher, ctx) {
            Ok(item) => result.items.push(item),
            Err(e) => {
                tracing::debug!(
                    product_id = product.id,
                    variant_id = variant.id,
                    error = %e,
                    "Skipping variant in feed"
                );
                result.errors.push(e.to_string());
            }
        }
    }

    result
}

/// Renders one `<item>` block. All text content is XML-escaped; the
/// description is HTML-stripped and capped at the Merchant Center limit.
pub fn format_variant_item(
    product: &Product,
    variant: &Variant,
    publisher: Publisher,
    ctx: &FeedContext,
) -> Result<String, FormatError> {
    let price_raw = variant.price.as_deref().ok_or(FormatError::MissingPrice {
        product_id: product.id,
        variant_id: variant.id,
    })?;
    let price: f64 = price_raw.trim().parse().map_err(|_| FormatError::InvalidPrice {
        product_id: product.id,
        variant_id: variant.id,
        price: price_raw.to_string(),
    })?;

    let availability = match variant.available {
        Some(true) => "in stock",
        Some(false) => "out of stock",
        None => {
            return Err(FormatError::MissingAvailability {
                product_id: product.id,
                variant_id: variant.id,
            })
        }
    };

    let image = product
        .primary_image()
        .ok_or(FormatError::MissingImage { product_id: product.id })?;
    let image_link = resolve_image_url(image, ctx);

    let prefix = publisher.namespace_prefix();
    let item_id = item_id(product, variant);
    let title = item_title(product, variant);
    let description = item_description(product);
    let link = format!(
        "{}/products/{}?variant={}",
        ctx.site_url.trim_end_matches('/'),
        product.handle,
        variant.id
    );
    let brand = product
        .vendor
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(&ctx.site_name);

    let mut item = String::with_capacity(512);
    item.push_str("    <item>\n");
    let _ = writeln!(item, "      <{prefix}:id>{}</{prefix}:id>", escape(&item_id));
    let _ = writeln!(item, "      <{prefix}:title>{}</{prefix}:title>", escape(&title));
    let _ = writeln!(
        item,
        "      <{prefix}:description>{}</{prefix}:description>",
        escape(&description)
    );
    let _ = writeln!(item, "      <{prefix}:link>{}</{prefix}:link>", escape(&link));
    let _ = writeln!(
        item,
        "      <{prefix}:image_link>{}</{prefix}:image_link>",
        escape(&image_link)
    );
    let _ = writeln!(
        item,
        "      <{prefix}:price>{:.2} {}</{prefix}:price>",
        price,
        escape(&ctx.currency)
    );
    let _ = writeln!(
        item,
        "      <{prefix}:availability>{availability}</{prefix}:availability>"
    );
    let _ = writeln!(item, "      <{prefix}:brand>{}</{prefix}:brand>", escape(brand));
    let _ = writeln!(item, "      <{prefix}:condition>new</{prefix}:condition>");
    if let Some(product_type) = product.product_type.as_deref().filter(|t| !t.is_empty()) {
        let _ = writeln!(
            item,
            "      <{prefix}:product_type>{}</{prefix}:product_type>",
            escape(product_type)
        );
    }
    item.push_str("    </item>\n");

    Ok(item)
}

/// Stable item identifier: the SKU when present, otherwise
/// `{product_id}-{variant_id}`.
fn item_id(product: &Product, variant: &Variant) -> String {
    match variant.sku.as_deref().map(str::trim) {
        Some(sku) if !sku.is_empty() => sku.to_string(),
        _ => format!("{}-{}", product.id, variant.id),
    }
}

/// Product title, with the variant's option values appended when the
/// variant is a real option (not the upstream's "Default Title" filler).
fn item_title(product: &Product, variant: &Variant) -> String {
    match variant.title.as_deref().map(str::trim) {
        Some(vt) if !vt.is_empty() && vt != "Default Title" => {
            format!("{} - {}", product.title, vt)
        }
        _ => product.title.clone(),
    }
}

fn item_description(product: &Product) -> String {
    let raw = product.body_html.as_deref().unwrap_or("");
    let stripped = strip_html_tags(raw);
    let collapsed = collapse_whitespace(&stripped);
    truncate_chars(&collapsed, DESCRIPTION_MAX_CHARS).to_string()
}

fn resolve_image_url(src: &str, ctx: &FeedContext) -> String {
    if src.starts_with("http://") || src.starts_with("https://") {
        return src.to_string();
    }
    let base = ctx
        .image_base_url
        .as_deref()
        .unwrap_or(&ctx.site_url)
        .trim_end_matches('/');
    format!("{}/{}", base, src.trim_start_matches('/'))
}
