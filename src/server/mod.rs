//! HTTP surface: router construction and shared request state.
//!
//! Everything a handler needs — config, the upstream catalog client,
//! the snapshot cache — is built once at startup and cloned into each
//! request through axum state. No module-level singletons.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::cache::CatalogCache;
use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::feed::FeedContext;

pub mod feeds;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: CatalogClient,
    pub cache: Arc<CatalogCache>,
}

impl AppState {
    /// Site-level formatting context derived from config.
    pub fn feed_context(&self) -> FeedContext {
        FeedContext {
            site_url: self.config.site_url.trim_end_matches('/').to_string(),
            site_name: self.config.site_name.clone(),
            image_base_url: self.config.image_base_url.clone(),
            currency: self.config.currency.clone(),
        }
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs` and
/// the black-box tests).
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(feeds::health))
        .route("/feed.xml", get(feeds::full_feed))
        .route("/feed/index.xml", get(feeds::feed_index))
        .route("/feed/pages/:page", get(feeds::feed_page))
        .with_state(state)
}
