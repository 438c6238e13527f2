//! URL handling module for site2pdf
//!
//! This module provides seed URL validation, exact origin comparison for
//! link-following, and filename sanitization for the job output layout.

mod origin;
mod sanitize;

use crate::UrlError;
use url::Url;

// Re-export main functions
pub use origin::Origin;
pub use sanitize::{page_file_name, sanitize_filename, MERGED_FILE_NAME};

/// Parses and validates a seed URL
///
/// A seed must be an absolute `http` or `https` URL with a non-empty host.
/// Anything else can never be loaded by the crawler, so it is rejected
/// before a job is created.
///
/// # Arguments
///
/// * `input` - The raw URL string supplied by the caller
///
/// # Returns
///
/// * `Ok(Url)` - The parsed seed URL
/// * `Err(UrlError)` - The URL is malformed or uses an unsupported scheme
///
/// # Examples
///
/// ```
/// use site2pdf::url::parse_seed_url;
///
/// let url = parse_seed_url("https://example.com").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/");
///
/// assert!(parse_seed_url("ftp://example.com/").is_err());
/// assert!(parse_seed_url("/relative/path").is_err());
/// ```
pub fn parse_seed_url(input: &str) -> Result<Url, UrlError> {
    let url = Url::parse(input).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost),
    }
}
