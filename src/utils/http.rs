// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::FeedConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &FeedConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Whether a feed location should be fetched over HTTP.
pub fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_default_config() {
        assert!(create_client(&FeedConfig::default()).is_ok());
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://feeds.example.com/news.xml"));
        assert!(is_remote("HTTP://example.com/feed.xml"));
        assert!(!is_remote("file:///tmp/feed.xml"));
        assert!(!is_remote("data/feed.xml"));
    }
}
