//! Feed endpoint handlers.
//!
//! Request validation happens before any catalog work: an unsupported
//! publisher or malformed page number is rejected with a plain-text 4xx
//! and no upstream traffic. Upstream failures surface as a generic 500
//! with the full error logged server-side only.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::cache::CatalogCache;
use crate::catalog::{filter_feed_eligible, prioritize_products, Product};
use crate::feed::{
    calculate_pagination_metadata, page_slice, validate_page_number, FeedStream, PageError,
    Publisher,
};
use crate::server::AppState;

const CONTENT_TYPE_XML: &str = "application/xml; charset=utf-8";
const CACHE_CONTROL_FEED: &str = "public, max-age=3600, s-maxage=7200";

#[derive(Debug, Deserialize, Default)]
pub struct FeedQuery {
    publisher: Option<String>,
}

/// Liveness probe; also exposes cache counters for quick diagnostics.
pub async fn health(State(state): State<AppState>) -> Response {
    let stats = state.cache.stats();
    Json(serde_json::json!({
        "status": "ok",
        "cache": {
            "hits": stats.hits,
            "misses": stats.misses,
            "entries": stats.entries,
        },
    }))
    .into_response()
}

/// `GET /feed.xml` — the full catalog as one streaming XML document.
///
/// Bypasses the snapshot cache: a complete feed pull must see the live
/// catalog. The body is produced batch-by-batch as the client reads, so
/// peak memory stays bounded by one batch regardless of catalog size.
pub async fn full_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Response {
    let publisher = match parse_publisher(&query) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let started = Instant::now();
    let products = match fetch_eligible_fresh(&state).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    // Fetch + filter phase; the stream itself runs after headers are sent
    let generation_ms = started.elapsed().as_millis() as u64;

    if products.is_empty() {
        return text_error(StatusCode::NOT_FOUND, "No products available for feed");
    }

    let total_products = products.len();
    let stream = FeedStream::new(
        products,
        publisher,
        state.feed_context(),
        state.config.batch_size,
        Duration::from_millis(state.config.progress_log_interval_ms),
    );

    tracing::info!(
        publisher = %publisher,
        products = total_products,
        fetch_ms = generation_ms,
        "Streaming full feed"
    );

    let body = Body::from_stream(tokio_stream::iter(stream.map(Ok::<_, Infallible>)));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, CONTENT_TYPE_XML)
        .header(header::CACHE_CONTROL, CACHE_CONTROL_FEED)
        .header("X-Total-Products", total_products.to_string())
        .header("X-Generation-Time-Ms", generation_ms.to_string())
        .header("X-Publisher", publisher.as_str())
        .body(body)
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to build streaming response");
            text_error(StatusCode::INTERNAL_SERVER_ERROR, "Feed generation failed")
        })
}

/// `GET /feed/index.xml` — sitemap-style index of the paginated feed.
pub async fn feed_index(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Response {
    let publisher = match parse_publisher(&query) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let products = match fetch_eligible_cached(&state).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let per_page = state.config.products_per_page;
    let meta = calculate_pagination_metadata(products.len(), 1, per_page);
    if meta.total_pages == 0 {
        return text_error(StatusCode::NOT_FOUND, "No products available for feed");
    }

    let base = state.config.site_url.trim_end_matches('/');
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for page in 1..=meta.total_pages {
        xml.push_str(&format!(
            "  <sitemap>\n    <loc>{base}/feed/pages/{page}.xml?publisher={publisher}</loc>\n  </sitemap>\n"
        ));
    }
    xml.push_str("</sitemapindex>\n");

    (
        StatusCode::OK,
        [
            ("content-type", CONTENT_TYPE_XML.to_string()),
            ("cache-control", CACHE_CONTROL_FEED.to_string()),
            ("x-total-pages", meta.total_pages.to_string()),
            ("x-products-per-page", per_page.to_string()),
        ],
        xml,
    )
        .into_response()
}

/// `GET /feed/pages/{page}.xml` — one buffered page of the feed.
///
/// Malformed page numbers → 400, pages beyond the current catalog →
/// 404; both checked before any formatting work. Pagination is
/// recomputed from the current (cached) catalog, so page boundaries can
/// shift between an index request and a page request.
pub async fn feed_page(
    State(state): State<AppState>,
    Path(page_raw): Path<String>,
    Query(query): Query<FeedQuery>,
) -> Response {
    let publisher = match parse_publisher(&query) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    // Accept "3" and "3.xml"; reject malformed input (including page 0,
    // pages are 1-based) before fetching
    let page_raw = page_raw.trim_end_matches(".xml");
    if !matches!(page_raw.trim().parse::<usize>(), Ok(p) if p >= 1) {
        return text_error(StatusCode::BAD_REQUEST, &PageError::InvalidFormat.to_string());
    }

    let started = Instant::now();
    let products = match fetch_eligible_cached(&state).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let per_page = state.config.products_per_page;
    let total_pages = calculate_pagination_metadata(products.len(), 1, per_page).total_pages;
    let page = match validate_page_number(page_raw, total_pages) {
        Ok(p) => p,
        Err(e @ PageError::InvalidFormat) => {
            return text_error(StatusCode::BAD_REQUEST, &e.to_string())
        }
        Err(e @ PageError::OutOfRange { .. }) => {
            return text_error(StatusCode::NOT_FOUND, &e.to_string())
        }
    };

    let (start, end) = page_slice(products.len(), page, per_page);
    let meta = calculate_pagination_metadata(products.len(), page, per_page);
    let slice = products[start..end].to_vec();

    let stream = FeedStream::new(
        slice,
        publisher,
        state.feed_context(),
        state.config.batch_size,
        Duration::from_millis(state.config.progress_log_interval_ms),
    );
    let (xml, stats) = stream.render_buffered();
    let generation_ms = started.elapsed().as_millis() as u64;

    tracing::info!(
        publisher = %publisher,
        page = page,
        total_pages = meta.total_pages,
        products = meta.products_in_page,
        items = stats.items,
        errors = stats.errors,
        generation_ms = generation_ms,
        "Served feed page"
    );

    (
        StatusCode::OK,
        [
            ("content-type", CONTENT_TYPE_XML.to_string()),
            ("cache-control", CACHE_CONTROL_FEED.to_string()),
            ("x-publisher", publisher.as_str().to_string()),
            ("x-total-products", meta.total_products.to_string()),
            ("x-total-pages", meta.total_pages.to_string()),
            ("x-products-in-page", meta.products_in_page.to_string()),
            ("x-feed-errors", stats.errors.to_string()),
            ("x-generation-time-ms", generation_ms.to_string()),
        ],
        xml,
    )
        .into_response()
}

fn parse_publisher(query: &FeedQuery) -> Result<Publisher, Response> {
    match query.publisher.as_deref() {
        None => Ok(Publisher::default()),
        Some(raw) => raw.parse::<Publisher>().map_err(|e| {
            text_error(StatusCode::BAD_REQUEST, &e.to_string())
        }),
    }
}

/// Live catalog fetch for the streaming endpoint: always bypasses the
/// snapshot cache.
async fn fetch_eligible_fresh(state: &AppState) -> Result<Vec<Product>, Response> {
    let products = state
        .catalog
        .fetch_all(state.config.bulk_page_size)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Bulk catalog fetch failed");
            text_error(StatusCode::INTERNAL_SERVER_ERROR, "Feed generation failed")
        })?;
    Ok(prioritize_products(filter_feed_eligible(products)))
}

/// Cached catalog read for the paginated endpoints. Best-effort: a
/// concurrent refill by another request is fine, last writer wins.
async fn fetch_eligible_cached(state: &AppState) -> Result<Arc<Vec<Product>>, Response> {
    if let Some(products) = state.cache.get(CatalogCache::FULL_CATALOG) {
        return Ok(products);
    }

    let products = Arc::new(fetch_eligible_fresh(state).await?);
    state
        .cache
        .put(CatalogCache::FULL_CATALOG, Arc::clone(&products));
    Ok(products)
}

fn text_error(status: StatusCode, message: &str) -> Response {
    (status, message.to_string()).into_response()
}
