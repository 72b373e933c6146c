//! Utility functions and helpers.

pub mod http;
pub mod report;

use std::path::PathBuf;

use url::Url;

use crate::error::{AppError, Result};

/// Resolve a non-HTTP feed location to a filesystem path.
///
/// Accepts `file://` URLs and bare paths.
pub fn local_path(location: &str) -> Result<PathBuf> {
    let location = location.trim();
    if location.starts_with("file://") {
        let url = Url::parse(location)?;
        return url
            .to_file_path()
            .map_err(|_| AppError::config(format!("Not a local file URL: {location}")));
    }
    Ok(PathBuf::from(location))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path_bare() {
        assert_eq!(
            local_path("data/feed.xml").unwrap(),
            PathBuf::from("data/feed.xml")
        );
    }

    #[test]
    fn test_local_path_file_url() {
        assert_eq!(
            local_path("file:///tmp/feed.xml").unwrap(),
            PathBuf::from("/tmp/feed.xml")
        );
    }
}
