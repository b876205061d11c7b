//! Utility functions shared across the feed pipeline.
//!
//! - **URL validation**: scheme checks for configured base URLs
//! - **Text processing**: HTML stripping and character-bounded truncation
//!   for feed item descriptions

mod text;
mod url_validator;

pub use text::{collapse_whitespace, strip_html_tags, truncate_chars};
pub use url_validator::{validate_base_url, UrlValidationError};
