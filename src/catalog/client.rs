//! Product source adapter for the upstream catalog API.
//!
//! Bulk fetches deliberately bypass any caching layer: feeds must reflect
//! the live catalog, and a stale price in an advertising feed is worse
//! than a slow response. There is also no retry here — a failure on page
//! N discards everything fetched so far, and the caller (a cron or a
//! manual refresh) retries the whole request.

use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use thiserror::Error;

use super::types::{Product, ProductPage};

/// Upstream cap on the `limit` query parameter. Requests asking for more
/// are clamped; the page-loop termination check uses the clamped value.
pub const MAX_PAGE_LIMIT: usize = 100;

/// Default page size for bulk catalog fetches.
pub const DEFAULT_BULK_PAGE_SIZE: usize = 250;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum response body per page (10 MB).
const MAX_PAGE_SIZE: usize = 10 * 1024 * 1024;

/// Errors from the catalog client.
///
/// All of these abort the whole bulk fetch; none are recovered locally.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("Upstream HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the 30-second timeout
    #[error("Upstream request timed out")]
    Timeout,
    /// Response body exceeded the 10MB per-page limit
    #[error("Upstream response too large")]
    ResponseTooLarge,
    /// Response body was not the expected JSON shape
    #[error("Failed to decode product page: {0}")]
    Decode(#[from] serde_json::Error),
}

/// HTTP client for the upstream product catalog.
///
/// Explicitly constructed at startup and shared via server state, never a
/// module-level singleton. Cloning is cheap (`reqwest::Client` is an Arc
/// internally).
#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<SecretString>,
}

impl CatalogClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_token: Option<SecretString>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
        }
    }

    /// Fetch one page of the product listing.
    ///
    /// `limit` is clamped to [`MAX_PAGE_LIMIT`]; pages are 1-based.
    pub async fn fetch_page(&self, page: usize, limit: usize) -> Result<Vec<Product>, CatalogError> {
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);
        let url = format!(
            "{}/products.json?page={}&limit={}",
            self.base_url, page, limit
        );

        let mut request = self.client.get(&url);
        if let Some(token) = &self.api_token {
            request = request.header("Authorization", format!("Bearer {}", token.expose_secret()));
        }

        let response = tokio::time::timeout(REQUEST_TIMEOUT, request.send())
            .await
            .map_err(|_| CatalogError::Timeout)?
            .map_err(CatalogError::Network)?;

        if !response.status().is_success() {
            return Err(CatalogError::HttpStatus(response.status().as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_PAGE_SIZE).await?;
        let page_body: ProductPage = serde_json::from_slice(&bytes)?;

        tracing::debug!(
            page = page,
            limit = limit,
            products = page_body.products.len(),
            "Fetched catalog page"
        );

        Ok(page_body.products)
    }

    /// Fetch the entire catalog by iterating pages.
    ///
    /// Requests pages of `page_size` (clamped per request to
    /// [`MAX_PAGE_LIMIT`]) starting at page 1, concatenating results in
    /// order, and stops when a page comes back with fewer items than the
    /// effective limit or empty. Any page failure propagates and discards
    /// everything fetched so far.
    pub async fn fetch_all(&self, page_size: usize) -> Result<Vec<Product>, CatalogError> {
        let effective_limit = page_size.clamp(1, MAX_PAGE_LIMIT);
        let mut all = Vec::new();
        let mut page = 1usize;

        loop {
            let products = self.fetch_page(page, effective_limit).await?;
            let count = products.len();
            all.extend(products);

            if count < effective_limit {
                break;
            }
            page += 1;
        }

        tracing::info!(products = all.len(), pages = page, "Bulk catalog fetch complete");
        Ok(all)
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, CatalogError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(CatalogError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(CatalogError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(CatalogError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
