// src/config.rs

//! Configuration loading utilities.
//!
//! This module provides convenience functions for loading configuration
//! from files, S3, and environment overrides.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;

#[cfg(feature = "s3")]
use crate::storage::s3::S3Storage;

/// Load configuration from a TOML file and validate it.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::load(path)
        .map_err(|e| AppError::config(format!("Failed to load {}: {e}", path.display())))?;
    apply_env_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

/// Apply `FEED_URL`, `FEED_TIMEOUT_SECS` and `AUTHOR_ID` overrides.
pub fn apply_env_overrides(config: &mut Config) {
    if let Ok(url) = std::env::var("FEED_URL") {
        if !url.trim().is_empty() {
            config.feed.url = url;
        }
    }

    if let Ok(timeout) = std::env::var("FEED_TIMEOUT_SECS") {
        match timeout.parse() {
            Ok(secs) => config.feed.timeout_secs = secs,
            Err(_) => log::warn!("Ignoring invalid FEED_TIMEOUT_SECS: {}", timeout),
        }
    }

    if let Ok(author) = std::env::var("AUTHOR_ID") {
        match author.parse() {
            Ok(id) => config.author_id = id,
            Err(_) => log::warn!("Ignoring invalid AUTHOR_ID: {}", author),
        }
    }
}

/// Config loader for the Lambda environment.
#[cfg(feature = "s3")]
pub struct S3ConfigLoader<'a> {
    storage: &'a S3Storage,
    key: String,
}

#[cfg(feature = "s3")]
impl<'a> S3ConfigLoader<'a> {
    pub fn new(storage: &'a S3Storage, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Read, override and validate the configuration object.
    pub async fn load_config(&self) -> Result<Config> {
        log::info!("Loading config file from S3: {}", self.key);
        let bytes = self
            .storage
            .read_bytes_optional(&self.key)
            .await?
            .ok_or_else(|| AppError::config(format!("Config file not found in S3: {}", self.key)))?;

        let s = String::from_utf8(bytes).map_err(|e| {
            AppError::config(format!("Config file {} is not valid UTF-8: {}", self.key, e))
        })?;

        let mut config = Config::from_toml(&s)?;
        apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_validates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");

        std::fs::write(&path, "author_id = 2\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        std::fs::write(
            &path,
            "author_id = 2\n\n[[categories]]\nexternal_id = \"5\"\ninternal_id = 12\n",
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.categories.len(), 1);
    }

    #[test]
    fn test_load_config_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = load_config(&tmp.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
