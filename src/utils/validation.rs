//! URL and input validation utilities

use anyhow::{anyhow, Result};
use url::Url;

/// Parse an absolute URL
pub fn validate_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| anyhow!("Invalid URL format: {}", e))
}

/// Check if URL can be used as a submission endpoint
pub fn is_http_url(url: &str) -> bool {
    if let Ok(parsed) = Url::parse(url) {
        let scheme = parsed.scheme();
        scheme == "http" || scheme == "https"
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_urls() {
        assert!(is_http_url("http://127.0.0.1:5005/"));
        assert!(is_http_url("https://geo.example.org/csv/"));
        assert!(!is_http_url("ftp://example.org/"));
        assert!(!is_http_url("/relative"));
        assert!(validate_url("nope").is_err());
    }
}
