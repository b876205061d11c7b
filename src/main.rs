use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use feedmill::cache::CatalogCache;
use feedmill::catalog::CatalogClient;
use feedmill::config::Config;
use feedmill::server::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "feedmill", about = "Merchant Center XML feed generator")]
struct Args {
    /// Path to the TOML config file (missing file uses defaults)
    #[arg(long, value_name = "FILE", default_value = "feedmill.toml")]
    config: PathBuf,

    /// Override the configured listen address
    #[arg(long, value_name = "ADDR")]
    listen: Option<String>,

    /// Load config, probe the upstream with a one-page fetch, and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let api_token = config.resolve_api_token();
    let config = Arc::new(config);

    let http_client = reqwest::Client::builder()
        .user_agent(concat!("feedmill/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
    let catalog = CatalogClient::new(http_client, config.upstream_url.clone(), api_token);

    if args.check {
        let products = catalog
            .fetch_page(1, 1)
            .await
            .context("Upstream probe failed")?;
        println!(
            "ok: upstream {} reachable ({} product{} on first page probe)",
            config.upstream_url,
            products.len(),
            if products.len() == 1 { "" } else { "s" },
        );
        return Ok(());
    }

    let cache = Arc::new(CatalogCache::new(Duration::from_secs(config.cache_ttl_secs)));
    let listen_addr = args
        .listen
        .unwrap_or_else(|| config.listen_addr.clone());

    let state = AppState { config, catalog, cache };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind {listen_addr}"))?;

    tracing::info!(addr = %listen_addr, "Listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
