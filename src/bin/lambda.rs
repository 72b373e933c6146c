//! AWS Lambda entry point for feedsync
//!
//! Deploy with `cargo lambda build --release --features lambda` and attach a
//! schedule rule; every invocation performs one reconciliation run.
//!
//! ## Environment Variables
//!
//! - `S3_BUCKET`: bucket holding the store document and config (required)
//! - `S3_PREFIX`: key prefix (default: `feedsync`)
//! - `CONFIG_S3_KEY`: config object key (default: `{S3_PREFIX}/config.toml`)
//! - `FEED_URL`, `FEED_TIMEOUT_SECS`, `AUTHOR_ID`: config overrides
//! - `RUST_LOG`: Log level (e.g., `info`, `debug`)

use lambda_runtime::{Error as LambdaError, service_fn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("feedsync Lambda starting...");
    lambda_runtime::run(service_fn(feedsync::lambda::handler)).await
}
