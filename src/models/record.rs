//! Content store records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FeedArticle;

/// Identifier assigned to a record by the content store.
pub type LocalId = u64;

/// Publication state of a record.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Publish,
}

/// Field values written to the store on create or update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordFields {
    pub title: String,
    pub body: String,
    pub excerpt: String,
    pub status: PostStatus,
    pub author_id: u64,

    /// `None` leaves the record uncategorized
    pub category_id: Option<u64>,
}

impl RecordFields {
    /// Build the field set for an article with its resolved category.
    pub fn from_article(article: &FeedArticle, author_id: u64, category_id: Option<u64>) -> Self {
        Self {
            title: article.title.clone(),
            body: article.body.clone(),
            excerpt: article.excerpt.clone(),
            status: PostStatus::Publish,
            author_id,
            category_id,
        }
    }
}

/// A persisted article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentRecord {
    pub local_id: LocalId,
    #[serde(flatten)]
    pub fields: RecordFields,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl ContentRecord {
    pub fn timestamps(&self) -> RecordTimestamps {
        RecordTimestamps {
            created_at: self.created_at,
            modified_at: self.modified_at,
        }
    }
}

/// Creation and last-modification times of a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordTimestamps {
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Persisted link between a record and the feed article it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct IdentityTag {
    pub local_id: LocalId,
    pub external_id: String,
}
