use thiserror::Error;
use url::Url;

/// Errors that can occur while validating configured base URLs.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL carries a query string or fragment, which would corrupt
    /// the URLs we derive from it.
    #[error("Base URL must not contain a query or fragment")]
    NotABase,
}

/// Validates a configured base URL (upstream catalog API, storefront site,
/// image CDN).
///
/// These URLs come from the operator's config file, not from end users, so
/// the check is about catching misconfiguration early rather than hostile
/// input: http/https only, no query/fragment, and a real host. Localhost
/// and private addresses are allowed — pointing the service at an internal
/// catalog API is a supported deployment.
pub fn validate_base_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::UnsupportedScheme(other.to_string())),
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(UrlValidationError::NotABase);
    }

    if url.host_str().is_none() {
        return Err(UrlValidationError::InvalidUrl(
            url::ParseError::EmptyHost,
        ));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_https_base() {
        let url = validate_base_url("https://shop.example.com").unwrap();
        assert_eq!(url.host_str(), Some("shop.example.com"));
    }

    #[test]
    fn test_valid_http_localhost_base() {
        // Internal catalog APIs are a supported deployment target
        assert!(validate_base_url("http://127.0.0.1:8081").is_ok());
        assert!(validate_base_url("http://localhost:9000/api").is_ok());
    }

    #[test]
    fn test_rejects_file_scheme() {
        let err = validate_base_url("file:///etc/passwd").unwrap_err();
        assert!(matches!(err, UrlValidationError::UnsupportedScheme(_)));
    }

    #[test]
    fn test_rejects_query() {
        let err = validate_base_url("https://example.com/?page=1").unwrap_err();
        assert!(matches!(err, UrlValidationError::NotABase));
    }

    #[test]
    fn test_rejects_fragment() {
        let err = validate_base_url("https://example.com/#top").unwrap_err();
        assert!(matches!(err, UrlValidationError::NotABase));
    }

    #[test]
    fn test_rejects_unparseable() {
        assert!(validate_base_url("not a url").is_err());
    }
}
