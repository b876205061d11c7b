//! Configuration file parser for the feedmill service.
//!
//! The config file is optional — a missing file yields `Config::default()`,
//! which points at localhost defaults suitable for development. Unknown
//! keys are silently ignored by serde, though we log a warning when the
//! file contains potential typos.

use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid {field}: {source}")]
    InvalidUrl {
        field: &'static str,
        source: crate::util::UrlValidationError,
    },

    #[error("Invalid {field}: must be at least 1")]
    ZeroSize { field: &'static str },
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Top-level service configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified. Missing keys fall back to `Default::default()`.
///
/// The custom `Debug` impl masks `api_token` to keep the upstream
/// credential out of logs and error messages.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub listen_addr: String,

    /// Base URL of the upstream product catalog API
    /// (pages are fetched from `{upstream_url}/products.json`).
    pub upstream_url: String,

    /// Public storefront base URL used to build item links.
    pub site_url: String,

    /// Storefront name used as the feed channel title.
    pub site_name: String,

    /// Optional CDN base prepended to relative image paths.
    pub image_base_url: Option<String>,

    /// ISO 4217 currency code appended to prices (e.g. "USD").
    pub currency: String,

    /// Products per paginated feed document.
    pub products_per_page: usize,

    /// Products formatted per streamed XML chunk.
    pub batch_size: usize,

    /// Page size used when bulk-fetching the whole catalog. Individual
    /// HTTP requests are still clamped to the upstream's cap of 100.
    pub bulk_page_size: usize,

    /// Seconds a cached catalog snapshot stays fresh for paginated requests.
    pub cache_ttl_secs: u64,

    /// Minimum milliseconds between progress log lines during streaming.
    pub progress_log_interval_ms: u64,

    /// Bearer token for the upstream API (FEEDMILL_API_TOKEN env var
    /// takes precedence over the config file).
    pub api_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            upstream_url: "http://127.0.0.1:8081".to_string(),
            site_url: "http://127.0.0.1:3000".to_string(),
            site_name: "Storefront".to_string(),
            image_base_url: None,
            currency: "USD".to_string(),
            products_per_page: 5000,
            batch_size: crate::feed::DEFAULT_BATCH_SIZE,
            bulk_page_size: crate::catalog::DEFAULT_BULK_PAGE_SIZE,
            cache_ttl_secs: 3600,
            progress_log_interval_ms: 5000,
            api_token: None,
        }
    }
}

/// Mask `api_token` in Debug output to prevent credential leakage.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("upstream_url", &self.upstream_url)
            .field("site_url", &self.site_url)
            .field("site_name", &self.site_name)
            .field("image_base_url", &self.image_base_url)
            .field("currency", &self.currency)
            .field("products_per_page", &self.products_per_page)
            .field("batch_size", &self.batch_size)
            .field("bulk_page_size", &self.bulk_page_size)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field(
                "progress_log_interval_ms",
                &self.progress_log_interval_ms,
            )
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted, logged as a warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading so a corrupted config cannot
        // exhaust memory.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse as a raw table first to warn about likely typos
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "listen_addr",
                "upstream_url",
                "site_url",
                "site_name",
                "image_base_url",
                "currency",
                "products_per_page",
                "batch_size",
                "bulk_page_size",
                "cache_ttl_secs",
                "progress_log_interval_ms",
                "api_token",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!(
            path = %path.display(),
            upstream = %config.upstream_url,
            site = %config.site_url,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Check the configured base URLs parse and carry no query/fragment,
    /// and that the page and batch sizes are positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("products_per_page", self.products_per_page),
            ("batch_size", self.batch_size),
            ("bulk_page_size", self.bulk_page_size),
        ];
        for (field, value) in sizes {
            if value == 0 {
                return Err(ConfigError::ZeroSize { field });
            }
        }
        crate::util::validate_base_url(&self.upstream_url)
            .map_err(|source| ConfigError::InvalidUrl { field: "upstream_url", source })?;
        crate::util::validate_base_url(&self.site_url)
            .map_err(|source| ConfigError::InvalidUrl { field: "site_url", source })?;
        if let Some(img) = &self.image_base_url {
            crate::util::validate_base_url(img)
                .map_err(|source| ConfigError::InvalidUrl { field: "image_base_url", source })?;
        }
        Ok(())
    }

    /// Resolve the upstream API token: env var wins over the config file.
    pub fn resolve_api_token(&self) -> Option<SecretString> {
        std::env::var("FEEDMILL_API_TOKEN")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.api_token.clone())
            .map(SecretString::from)
    }
}

// ============================================================================
// Tests
// ============================================================================
