// src/error.rs

//! Unified error handling for the sync engine.

use std::fmt;

use thiserror::Error;

use crate::models::LocalId;

/// Result type alias for feedsync operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Coarse classification of an error, reported when a run aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Fetch,
    Store,
    Config,
    Cancelled,
    Other,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Fetch => "fetch",
            ErrorKind::Store => "store",
            ErrorKind::Config => "config",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Feed could not be retrieved or parsed
    #[error("Fetch error for {source_url}: {message}")]
    Fetch { source_url: String, message: String },

    /// Content store rejected a read or mutation
    #[error("Store error during {operation}: {message}")]
    Store { operation: String, message: String },

    /// AWS S3 error
    #[error("S3 error: {0}")]
    S3(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML deserialization failed
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::DeError),

    /// XML document is not well-formed
    #[error("XML syntax error: {0}")]
    XmlSyntax(#[from] quick_xml::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Run was cancelled between articles. `changed` lists the records
    /// created or updated before the cancellation; those changes stand.
    #[error("Run cancelled after {processed} article(s), {} record(s) already changed", .changed.len())]
    Cancelled {
        processed: usize,
        changed: Vec<LocalId>,
    },
}

impl AppError {
    /// Create a fetch error for the given feed location.
    pub fn fetch(source_url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            source_url: source_url.into(),
            message: message.to_string(),
        }
    }

    /// Create a store error for the named operation.
    pub fn store(operation: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Store {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Classify the error for run reporting.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Fetch { .. }
            | AppError::Http(_)
            | AppError::Xml(_)
            | AppError::XmlSyntax(_)
            | AppError::Url(_) => ErrorKind::Fetch,
            AppError::Store { .. } | AppError::S3(_) => ErrorKind::Store,
            AppError::Config(_) | AppError::Validation(_) | AppError::Toml(_) => ErrorKind::Config,
            AppError::Cancelled { .. } => ErrorKind::Cancelled,
            AppError::Io(_) | AppError::Json(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            AppError::fetch("http://x/feed.xml", "boom").kind(),
            ErrorKind::Fetch
        );
        assert_eq!(AppError::store("create", "disk full").kind(), ErrorKind::Store);
        assert_eq!(AppError::config("bad").kind(), ErrorKind::Config);
        assert_eq!(
            AppError::Cancelled {
                processed: 2,
                changed: vec![4],
            }
            .kind(),
            ErrorKind::Cancelled
        );
    }

    #[test]
    fn test_cancelled_display_counts_changes() {
        let err = AppError::Cancelled {
            processed: 3,
            changed: vec![7, 8],
        };
        assert_eq!(
            err.to_string(),
            "Run cancelled after 3 article(s), 2 record(s) already changed"
        );
    }

    #[test]
    fn test_display() {
        let err = AppError::store("attach_tag", "locked");
        assert_eq!(err.to_string(), "Store error during attach_tag: locked");
    }
}
