//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Feed location and HTTP settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Author assigned to every record the engine writes
    #[serde(default = "defaults::author_id")]
    pub author_id: u64,

    /// External category code to internal category id table
    #[serde(default)]
    pub categories: Vec<CategoryMapping>,

    /// Reconciliation policy
    #[serde(default)]
    pub sync: SyncConfig,

    /// Local store settings
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.drop_blank_mappings();
        Ok(config)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.feed.url.trim().is_empty() {
            return Err(AppError::validation("feed.url is empty"));
        }
        if self.feed.user_agent.trim().is_empty() {
            return Err(AppError::validation("feed.user_agent is empty"));
        }
        if self.feed.timeout_secs == 0 {
            return Err(AppError::validation("feed.timeout_secs must be > 0"));
        }
        if self.author_id == 0 {
            return Err(AppError::validation("author_id must be > 0"));
        }
        if self.categories.is_empty() && self.sync.require_mappings {
            return Err(AppError::validation(
                "No categories defined (sync.require_mappings is set)",
            ));
        }
        Ok(())
    }

    // Blank rows carry no mapping; the first non-blank entry for a code wins.
    fn drop_blank_mappings(&mut self) {
        self.categories.retain(|m| !m.external_id.trim().is_empty());
        for mapping in &mut self.categories {
            mapping.external_id = mapping.external_id.trim().to_string();
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            author_id: defaults::author_id(),
            categories: Vec::new(),
            sync: SyncConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// Feed location and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Feed URL (`http(s)://`) or local file path
    #[serde(default = "defaults::feed_url")]
    pub url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: defaults::feed_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// One row of the category mapping table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryMapping {
    /// Category code used by the feed publisher
    pub external_id: String,

    /// Local category id
    pub internal_id: u64,
}

impl CategoryMapping {
    pub fn new(external_id: impl Into<String>, internal_id: u64) -> Self {
        Self {
            external_id: external_id.into(),
            internal_id,
        }
    }
}

/// Reconciliation policy switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// End the run after the first create or update.
    #[serde(default = "defaults::stop_after_first_change")]
    pub stop_after_first_change: bool,

    /// Skip the run entirely when no category mappings are configured.
    #[serde(default = "defaults::require_mappings")]
    pub require_mappings: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            stop_after_first_change: defaults::stop_after_first_change(),
            require_mappings: defaults::require_mappings(),
        }
    }
}

/// Local content store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the store document
    #[serde(default = "defaults::root_dir")]
    pub root_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: defaults::root_dir(),
        }
    }
}

mod defaults {
    // Feed defaults
    pub fn feed_url() -> String {
        "http://domain.com/feed.xml".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; feedsync/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    pub fn author_id() -> u64 {
        1
    }

    // Sync defaults
    pub fn stop_after_first_change() -> bool {
        true
    }
    pub fn require_mappings() -> bool {
        true
    }

    pub fn root_dir() -> String {
        "storage".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Config {
        Config {
            categories: vec![CategoryMapping::new("5", 12)],
            ..Config::default()
        }
    }

    #[test]
    fn validate_configured_ok() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_mappings() {
        assert!(Config::default().validate().is_err());

        let mut config = Config::default();
        config.sync.require_mappings = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_url() {
        let mut config = configured();
        config.feed.url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = configured();
        config.feed.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_toml_applies_defaults() {
        let config = Config::from_toml(
            r#"
            author_id = 7

            [feed]
            url = "https://feeds.example.com/news.xml"

            [[categories]]
            external_id = "5"
            internal_id = 12

            [[categories]]
            external_id = " "
            internal_id = 99
            "#,
        )
        .unwrap();

        assert_eq!(config.author_id, 7);
        assert_eq!(config.feed.url, "https://feeds.example.com/news.xml");
        assert_eq!(config.feed.timeout_secs, 30);
        assert_eq!(config.categories, vec![CategoryMapping::new("5", 12)]);
        assert!(config.sync.stop_after_first_change);
        assert_eq!(config.storage.root_dir, "storage");
    }
}
