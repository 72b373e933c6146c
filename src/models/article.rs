//! Feed article data structures.

use serde::{Deserialize, Serialize};

/// An article read from the remote feed.
///
/// Only lives for the duration of a single run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedArticle {
    /// Stable identifier assigned by the feed publisher
    pub external_id: String,

    /// Article heading
    pub title: String,

    /// Full article body (usually HTML)
    pub body: String,

    /// Short summary
    pub excerpt: String,

    /// Publisher taxonomy code of the first category reference, if any
    pub external_category_id: Option<String>,
}

/// An article item that was skipped because it lacked required fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MalformedArticle {
    /// Zero-based position of the item in the feed
    pub position: usize,

    /// Why the item was rejected
    pub reason: String,
}

/// Parsed feed payload.
#[derive(Debug, Clone, Default)]
pub struct FeedBatch {
    /// Well-formed articles in feed order
    pub articles: Vec<FeedArticle>,

    /// Items that were skipped
    pub malformed: Vec<MalformedArticle>,
}

impl FeedBatch {
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
