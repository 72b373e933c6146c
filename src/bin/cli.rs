//! feedsync CLI
//!
//! Local execution entry point. Meant to be invoked by cron or another
//! scheduler, one run per tick. For AWS Lambda, use `feedsync-lambda`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use feedsync::{
    config::load_config,
    error::Result,
    models::Config,
    pipeline::{self, RunOutcome},
    services::{CategoryMapper, FeedClient, FeedSource, was_edited},
    storage::{ContentStore, IDENTITY_TAG_KEY, LocalStorage},
    utils::report::{header, sub_item},
};

/// feedsync - Article Feed Reconciler
#[derive(Parser, Debug)]
#[command(
    name = "feedsync",
    version,
    about = "Reconciles a remote article feed into a local content store"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the store directory from the configuration
    #[arg(short, long)]
    storage_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one reconciliation pass
    Sync {
        /// Process the whole feed instead of stopping at the first change
        #[arg(long)]
        all: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Fetch the feed and show how each article maps, without writing
    Preview,

    /// List records created from the feed
    Status,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Sync { all } => {
            let config = load_config(&cli.config)?;
            let storage = LocalStorage::new(storage_dir(&cli.storage_dir, &config));
            log::info!("Store: {}", storage.document_path().display());

            let report = pipeline::run_sync(&config, Arc::new(storage), all).await?;
            match report.outcome {
                RunOutcome::Created(id) => log::info!("Created record {}", id),
                RunOutcome::Updated(id) => log::info!("Updated record {}", id),
                RunOutcome::Unchanged => log::info!("Nothing to do"),
                RunOutcome::NotConfigured => {
                    log::warn!("No category mappings configured; nothing was synced")
                }
            }
        }

        Command::Validate => {
            log::info!("Validating {}...", cli.config.display());

            let config = Config::load(&cli.config)?;
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} category mapping(s), author {})",
                config.categories.len(),
                config.author_id
            );
        }

        Command::Preview => {
            let config = Config::load(&cli.config)?;
            let client = FeedClient::new(&config.feed)?;
            let mapper = CategoryMapper::new(config.categories.clone());

            let batch = client.fetch().await?;
            header(&format!("Preview: {}", client.location()));
            for article in &batch.articles {
                let category = article
                    .external_category_id
                    .as_deref()
                    .and_then(|code| mapper.resolve(code))
                    .map_or_else(|| "uncategorized".to_string(), |id| id.to_string());
                sub_item(&format!(
                    "{} [{}] {}",
                    article.external_id, category, article.title
                ));
            }
            for item in &batch.malformed {
                sub_item(&format!("item #{} skipped: {}", item.position, item.reason));
            }
            log::info!(
                "{} article(s), {} malformed",
                batch.articles.len(),
                batch.malformed.len()
            );
        }

        Command::Status => {
            let config = Config::load_or_default(&cli.config);
            let storage = LocalStorage::new(storage_dir(&cli.storage_dir, &config));

            if !storage.document_path().exists() {
                log::info!("No store found at {}", storage.document_path().display());
                return Ok(());
            }

            let tags = storage.query_tags(IDENTITY_TAG_KEY).await?;
            header(&format!("Store: {}", storage.document_path().display()));
            for tag in &tags {
                let Some(record) = storage.get(tag.local_id).await? else {
                    log::warn!("#{} <- {} (record missing)", tag.local_id, tag.external_id);
                    continue;
                };
                let edited = was_edited(&record.timestamps());
                sub_item(&format!(
                    "#{} <- {} {}{}",
                    record.local_id,
                    tag.external_id,
                    record.fields.title,
                    if edited { " (edited)" } else { "" }
                ));
            }
            log::info!("{} tagged record(s)", tags.len());
        }
    }

    Ok(())
}

fn storage_dir(flag: &Option<PathBuf>, config: &Config) -> PathBuf {
    flag.clone()
        .unwrap_or_else(|| PathBuf::from(&config.storage.root_dir))
}
