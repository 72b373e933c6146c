// src/models/mod.rs

//! Domain models for the sync engine.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod article;
mod config;
mod record;

// Re-export all public types
pub use article::{FeedArticle, FeedBatch, MalformedArticle};
pub use config::{CategoryMapping, Config, FeedConfig, StorageConfig, SyncConfig};
pub use record::{
    ContentRecord, IdentityTag, LocalId, PostStatus, RecordFields, RecordTimestamps,
};
