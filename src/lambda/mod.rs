// src/lambda/mod.rs

//! AWS Lambda handler for scheduled reconciliation runs.
//!
//! Each invocation:
//! 1. Loads the configuration object from S3
//! 2. Runs one reconciliation pass against the S3-backed store
//! 3. Returns the run report

use std::sync::Arc;

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::S3ConfigLoader;
use crate::error::Result;
use crate::pipeline::{RunReport, SyncEngine};
use crate::storage::s3::S3Storage;

const CONFIG_OBJECT: &str = "config.toml";

/// Lambda invocation payload.
#[derive(Debug, Default, Deserialize)]
pub struct SyncRequest {
    /// Process the whole feed instead of stopping at the first change
    #[serde(default)]
    pub full_pass: bool,
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct SyncResponse {
    /// Whether the run completed
    pub success: bool,

    /// Run details when it completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RunReport>,

    /// Kind of error that aborted the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,

    /// Error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<SyncRequest>,
) -> std::result::Result<SyncResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    info!("Starting sync: full_pass={}", request.full_pass);

    match run_sync(&request).await {
        Ok(report) => {
            info!(
                "Sync completed: {:?} ({} processed) in {}ms",
                report.outcome,
                report.articles_processed,
                start.elapsed().as_millis()
            );
            Ok(SyncResponse {
                success: true,
                report: Some(report),
                execution_time_ms: start.elapsed().as_millis() as u64,
                ..Default::default()
            })
        }
        Err(e) => {
            error!("Sync failed: {}", e);
            Ok(SyncResponse {
                success: false,
                error_kind: Some(e.kind().to_string()),
                error: Some(e.to_string()),
                execution_time_ms: start.elapsed().as_millis() as u64,
                ..Default::default()
            })
        }
    }
}

/// Internal run logic.
async fn run_sync(request: &SyncRequest) -> Result<RunReport> {
    let storage = Arc::new(S3Storage::from_env().await?);

    let key = config_key(&storage, std::env::var("CONFIG_S3_KEY").ok());
    let config = S3ConfigLoader::new(&storage, key).load_config().await?;

    let mut engine = SyncEngine::from_config(&config, storage.clone())?;
    if request.full_pass {
        engine = engine.stop_after_first_change(false);
    }
    engine.run().await
}

/// Config object key: an explicit override, else `config.toml` beside the store.
fn config_key(storage: &S3Storage, explicit: Option<String>) -> String {
    explicit
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .unwrap_or_else(|| storage.key(CONFIG_OBJECT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_request_defaults() {
        let req: SyncRequest = serde_json::from_str("{}").unwrap();
        assert!(!req.full_pass);
    }

    #[test]
    fn test_sync_request_full_pass() {
        let req: SyncRequest = serde_json::from_str(r#"{"full_pass": true}"#).unwrap();
        assert!(req.full_pass);
    }

    fn store_with_prefix(prefix: &str) -> S3Storage {
        let conf = aws_sdk_s3::Config::builder()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new("us-east-1"))
            .build();
        S3Storage::new(aws_sdk_s3::Client::from_conf(conf), "bucket", prefix)
    }

    #[test]
    fn test_config_key_sits_beside_store() {
        let storage = store_with_prefix(crate::storage::s3::DEFAULT_PREFIX);
        assert_eq!(config_key(&storage, None), "feedsync/config.toml");
        assert_eq!(storage.key(crate::storage::STORE_DOCUMENT), "feedsync/store.json");

        let storage = store_with_prefix("");
        assert_eq!(config_key(&storage, None), "config.toml");
    }

    #[test]
    fn test_config_key_override() {
        let storage = store_with_prefix("feedsync");
        assert_eq!(
            config_key(&storage, Some("shared/feed.toml".into())),
            "shared/feed.toml"
        );
        assert_eq!(config_key(&storage, Some("  ".into())), "feedsync/config.toml");
    }

    #[test]
    fn test_error_response_shape() {
        let response = SyncResponse {
            error_kind: Some("fetch".into()),
            error: Some("boom".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error_kind"], "fetch");
        assert!(json.get("report").is_none());
    }
}
