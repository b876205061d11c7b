//! Pagination math for the paged feed endpoints.
//!
//! Metadata is recomputed from the current product count on every
//! request; no snapshot is stored. A page that existed when the index
//! was generated can therefore 404 later if the catalog shrinks — a
//! known, accepted gap for a best-effort advertising feed.

use thiserror::Error;

/// Derived pagination state for one request. Never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationMetadata {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_products: usize,
    pub products_in_page: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Page-number validation failures, mapped to HTTP status codes by the
/// server layer (format errors → 400, range errors → 404).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("Invalid page number format")]
    InvalidFormat,
    #[error("Page {page} out of range (valid pages: 1..={total_pages})")]
    OutOfRange { page: usize, total_pages: usize },
}

/// Computes pagination metadata for `current_page` over `total_products`
/// items with `products_per_page` per page.
///
/// `total_pages` is `ceil(total / per_page)` — zero for an empty
/// catalog. `current_page` is taken as-is; use [`validate_page_number`]
/// first when the page came from a request.
pub fn calculate_pagination_metadata(
    total_products: usize,
    current_page: usize,
    products_per_page: usize,
) -> PaginationMetadata {
    // A zero page size is rejected at config load; treat it as 1 here
    // (as the stream does for batch size) rather than divide by zero.
    let per_page = products_per_page.max(1);
    let total_pages = total_products.div_ceil(per_page);
    let (start, end) = page_slice(total_products, current_page, per_page);

    PaginationMetadata {
        current_page,
        total_pages,
        total_products,
        products_in_page: end - start,
        has_next: current_page < total_pages,
        has_prev: current_page > 1 && total_pages > 0,
    }
}

/// Half-open index range `[start, end)` of the products on `page`.
/// Out-of-range pages yield an empty range clamped to `total`.
pub fn page_slice(total: usize, page: usize, per_page: usize) -> (usize, usize) {
    let per_page = per_page.max(1);
    let start = page.saturating_sub(1).saturating_mul(per_page).min(total);
    let end = start.saturating_add(per_page).min(total);
    (start, end)
}

/// Parses and range-checks a 1-based page number from a request.
///
/// Rejects non-numeric input and zero with [`PageError::InvalidFormat`],
/// and pages beyond `total_pages` with [`PageError::OutOfRange`]. On an
/// empty catalog `total_pages` is 0, so every page is out of range.
pub fn validate_page_number(raw: &str, total_pages: usize) -> Result<usize, PageError> {
    let page: usize = raw.trim().parse().map_err(|_| PageError::InvalidFormat)?;
    if page < 1 {
        return Err(PageError::InvalidFormat);
    }
    if page > total_pages {
        return Err(PageError::OutOfRange { page, total_pages });
    }
    Ok(page)
}
