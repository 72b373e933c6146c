//! Pipeline entry points for reconciliation runs.
//!
//! - `SyncEngine`: fetch, match, and apply one feed against one store
//! - `run_sync`: build an engine from configuration and run it once

pub mod report;
pub mod sync;

use std::sync::Arc;

pub use report::{Change, ChangeKind, RunOutcome, RunReport};
pub use sync::SyncEngine;

use crate::error::Result;
use crate::models::Config;
use crate::storage::ContentStore;
use crate::utils::report as console;

/// Run one reconciliation pass for the configured feed.
///
/// `full_pass` processes the whole feed instead of stopping at the first
/// create or update.
pub async fn run_sync(
    config: &Config,
    store: Arc<dyn ContentStore>,
    full_pass: bool,
) -> Result<RunReport> {
    console::header("feedsync: reconciliation run");

    let mut engine = SyncEngine::from_config(config, store)?;
    if full_pass {
        engine = engine.stop_after_first_change(false);
    }

    log::info!(
        "Feed: {} ({} category mapping(s))",
        engine.source().location(),
        engine.mapper().len()
    );

    let report = engine.run().await.inspect_err(|e| {
        log::error!("Run aborted ({}): {}", e.kind(), e);
    })?;

    console::summary("Reconciliation", &report.summary_items());
    Ok(report)
}
