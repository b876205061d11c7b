//! Target advertising platforms and their feed namespaces.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The advertising platform a feed is rendered for. Determines the
/// namespace prefix and xmlns declaration of item fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Publisher {
    Google,
    Bing,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unsupported publisher: {0} (expected one of: google, bing)")]
pub struct PublisherError(pub String);

impl Publisher {
    /// Namespace prefix for item fields (`<g:price>` vs `<bing:price>`).
    pub fn namespace_prefix(&self) -> &'static str {
        match self {
            Publisher::Google => "g",
            Publisher::Bing => "bing",
        }
    }

    /// The xmlns URI bound to [`Self::namespace_prefix`].
    pub fn namespace_uri(&self) -> &'static str {
        match self {
            Publisher::Google => "http://base.google.com/ns/1.0",
            Publisher::Bing => "http://schemas.microsoft.com/merchant/1.0",
        }
    }

    /// Lowercase identifier used in URLs, headers, and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Publisher::Google => "google",
            Publisher::Bing => "bing",
        }
    }
}

impl Default for Publisher {
    fn default() -> Self {
        Publisher::Google
    }
}

impl fmt::Display for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Publisher {
    type Err = PublisherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(Publisher::Google),
            "bing" => Ok(Publisher::Bing),
            other => Err(PublisherError(other.to_string())),
        }
    }
}
