// src/pipeline/sync.rs

//! Reconciliation engine.
//!
//! One run fetches the feed, builds the identity index once, then walks the
//! articles in feed order:
//!
//! - unknown external id: create the record and tag it
//! - known id, record untouched since ingestion: overwrite it with the feed copy
//! - known id, record edited locally: leave it alone
//!
//! With `stop_after_first_change` set (the default) the run ends at the first
//! create or update.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, ErrorKind, Result};
use crate::models::{Config, FeedArticle, RecordFields, SyncConfig};
use crate::pipeline::report::{Change, ChangeKind, RunOutcome, RunReport};
use crate::services::{CategoryMapper, FeedClient, FeedSource, IdentityIndex, was_edited};
use crate::storage::{ContentStore, IDENTITY_TAG_KEY};

/// Long-lived engine built once from configuration.
pub struct SyncEngine {
    source: Arc<dyn FeedSource>,
    store: Arc<dyn ContentStore>,
    mapper: CategoryMapper,
    author_id: u64,
    policy: SyncConfig,
}

impl SyncEngine {
    /// Create an engine over an explicit feed source.
    pub fn new(config: &Config, source: Arc<dyn FeedSource>, store: Arc<dyn ContentStore>) -> Self {
        Self {
            source,
            store,
            mapper: CategoryMapper::new(config.categories.clone()),
            author_id: config.author_id,
            policy: config.sync.clone(),
        }
    }

    /// Create an engine reading the feed configured in `config.feed`.
    pub fn from_config(config: &Config, store: Arc<dyn ContentStore>) -> Result<Self> {
        let source = FeedClient::new(&config.feed)?;
        Ok(Self::new(config, Arc::new(source), store))
    }

    /// Override the early-stop policy.
    pub fn stop_after_first_change(mut self, stop: bool) -> Self {
        self.policy.stop_after_first_change = stop;
        self
    }

    pub fn mapper(&self) -> &CategoryMapper {
        &self.mapper
    }

    pub fn source(&self) -> &dyn FeedSource {
        self.source.as_ref()
    }

    /// Run one reconciliation pass.
    pub async fn run(&self) -> Result<RunReport> {
        self.run_until(&CancellationToken::new()).await
    }

    /// Run one reconciliation pass, checking `cancel` between articles.
    ///
    /// Mutations applied before cancellation or a store failure are kept.
    pub async fn run_until(&self, cancel: &CancellationToken) -> Result<RunReport> {
        let mut report = RunReport::new(Utc::now());

        if self.policy.require_mappings && self.mapper.is_empty() {
            log::warn!("No category mappings configured; skipping run");
            report.outcome = RunOutcome::NotConfigured;
            report.finish();
            return Ok(report);
        }

        let batch = self.source.fetch().await?;
        report.articles_seen = batch.articles.len();
        report.malformed = batch.malformed.len();

        let mut index = IdentityIndex::build(self.store.as_ref())
            .await
            .map_err(|e| store_error("query_tags", e))?;
        log::info!(
            "Reconciling {} article(s) against {} known record(s)",
            batch.articles.len(),
            index.len()
        );

        for article in &batch.articles {
            if cancel.is_cancelled() {
                let changed: Vec<_> = report.changes.iter().map(|c| c.local_id).collect();
                log::warn!(
                    "Run cancelled after {} article(s); records already changed: {:?}",
                    report.articles_processed,
                    changed
                );
                return Err(AppError::Cancelled {
                    processed: report.articles_processed,
                    changed,
                });
            }

            let change = self.reconcile(article, &mut index, &mut report).await?;
            report.articles_processed += 1;

            if let Some(change) = change {
                report.push_change(change);
                if self.policy.stop_after_first_change {
                    break;
                }
            }
        }

        report.finish();
        Ok(report)
    }

    /// Decide and apply the action for one article.
    async fn reconcile(
        &self,
        article: &FeedArticle,
        index: &mut IdentityIndex,
        report: &mut RunReport,
    ) -> Result<Option<Change>> {
        let category_id = article
            .external_category_id
            .as_deref()
            .and_then(|code| self.mapper.resolve(code));
        if category_id.is_none() {
            log::debug!(
                "Article {} has no mapped category ({:?})",
                article.external_id,
                article.external_category_id
            );
            report.uncategorized += 1;
        }

        let fields = RecordFields::from_article(article, self.author_id, category_id);

        let Some(local_id) = index.lookup(&article.external_id) else {
            let local_id = self
                .store
                .create(&fields)
                .await
                .map_err(|e| store_error("create", e))?;
            self.store
                .attach_tag(local_id, IDENTITY_TAG_KEY, &article.external_id)
                .await
                .map_err(|e| store_error("attach_tag", e))?;
            index.record(article.external_id.clone(), local_id);

            log::info!("Created record {} for article {}", local_id, article.external_id);
            return Ok(Some(Change {
                kind: ChangeKind::Created,
                local_id,
                external_id: article.external_id.clone(),
            }));
        };

        let timestamps = self
            .store
            .get_timestamps(local_id)
            .await
            .map_err(|e| store_error("get_timestamps", e))?;

        match timestamps {
            None => {
                log::warn!(
                    "Article {} is tagged to missing record {}; skipping",
                    article.external_id,
                    local_id
                );
                report.skipped_orphaned += 1;
                Ok(None)
            }
            Some(ts) if was_edited(&ts) => {
                log::debug!(
                    "Record {} was edited locally; keeping it over article {}",
                    local_id,
                    article.external_id
                );
                report.skipped_edited += 1;
                Ok(None)
            }
            Some(_) => {
                self.store
                    .update(local_id, &fields)
                    .await
                    .map_err(|e| store_error("update", e))?;

                log::info!("Updated record {} from article {}", local_id, article.external_id);
                Ok(Some(Change {
                    kind: ChangeKind::Updated,
                    local_id,
                    external_id: article.external_id.clone(),
                }))
            }
        }
    }
}

// Everything surfacing from the store boundary aborts the run as a store error.
fn store_error(operation: &str, error: AppError) -> AppError {
    match error.kind() {
        ErrorKind::Store => error,
        _ => AppError::store(operation, error),
    }
}
