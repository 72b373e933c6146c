//! Content store adapters.
//!
//! The engine talks to the store only through [`ContentStore`]. Records and
//! their identity tags live in a single JSON document for the bundled
//! backends:
//!
//! ```text
//! {root}/
//! └── store.json    # records + tags + id counter
//! ```

pub mod local;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{ContentRecord, IdentityTag, LocalId, RecordFields, RecordTimestamps};

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Tag key under which every record created by the engine stores its
/// external identifier.
pub const IDENTITY_TAG_KEY: &str = "feed_guid";

/// Key of the store document for file and object backends.
pub const STORE_DOCUMENT: &str = "store.json";

/// Trait for content store backends.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Return every tag stored under `key`.
    async fn query_tags(&self, key: &str) -> Result<Vec<IdentityTag>>;

    /// Create a record and return its new id.
    async fn create(&self, fields: &RecordFields) -> Result<LocalId>;

    /// Overwrite the fields of an existing record.
    async fn update(&self, id: LocalId, fields: &RecordFields) -> Result<()>;

    /// Attach `value` to a record under `key`.
    async fn attach_tag(&self, id: LocalId, key: &str, value: &str) -> Result<()>;

    /// Creation and modification times of a record, `None` if it is gone.
    async fn get_timestamps(&self, id: LocalId) -> Result<Option<RecordTimestamps>>;

    /// Fetch a full record.
    async fn get(&self, id: LocalId) -> Result<Option<ContentRecord>>;
}

/// A tag row as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagRow {
    pub local_id: LocalId,
    pub key: String,
    pub value: String,
}

/// Serializable store contents shared by the document-backed stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub next_id: LocalId,
    #[serde(default)]
    pub records: BTreeMap<LocalId, ContentRecord>,
    #[serde(default)]
    pub tags: Vec<TagRow>,
}

impl StoreDocument {
    pub fn query_tags(&self, key: &str) -> Vec<IdentityTag> {
        self.tags
            .iter()
            .filter(|row| row.key == key)
            .map(|row| IdentityTag {
                local_id: row.local_id,
                external_id: row.value.clone(),
            })
            .collect()
    }

    /// Insert a new record stamped with the current time.
    pub fn create(&mut self, fields: &RecordFields) -> LocalId {
        self.next_id = self.next_id.max(self.records.keys().max().copied().unwrap_or(0)) + 1;
        let id = self.next_id;
        let now = Utc::now();
        self.records.insert(
            id,
            ContentRecord {
                local_id: id,
                fields: fields.clone(),
                created_at: now,
                modified_at: now,
            },
        );
        id
    }

    /// Replace the fields of a record and bump its modification time.
    pub fn update(&mut self, id: LocalId, fields: &RecordFields) -> Result<()> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or_else(|| AppError::store("update", format!("record {id} not found")))?;
        record.fields = fields.clone();
        record.modified_at = Utc::now();
        Ok(())
    }

    pub fn attach_tag(&mut self, id: LocalId, key: &str, value: &str) -> Result<()> {
        if !self.records.contains_key(&id) {
            return Err(AppError::store(
                "attach_tag",
                format!("record {id} not found"),
            ));
        }
        self.tags.push(TagRow {
            local_id: id,
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    pub fn timestamps(&self, id: LocalId) -> Option<RecordTimestamps> {
        self.records.get(&id).map(ContentRecord::timestamps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostStatus;

    fn fields(title: &str) -> RecordFields {
        RecordFields {
            title: title.to_string(),
            body: "<p>body</p>".to_string(),
            excerpt: "excerpt".to_string(),
            status: PostStatus::Publish,
            author_id: 1,
            category_id: None,
        }
    }

    #[test]
    fn test_create_assigns_increasing_ids() {
        let mut doc = StoreDocument::default();
        let a = doc.create(&fields("a"));
        let b = doc.create(&fields("b"));
        assert_eq!((a, b), (1, 2));

        let record = &doc.records[&a];
        assert_eq!(record.created_at, record.modified_at);
    }

    #[test]
    fn test_update_bumps_modified_at() {
        let mut doc = StoreDocument::default();
        let id = doc.create(&fields("a"));
        doc.update(id, &fields("b")).unwrap();

        let record = &doc.records[&id];
        assert_eq!(record.fields.title, "b");
        assert!(record.modified_at >= record.created_at);
    }

    #[test]
    fn test_update_missing_record_is_store_error() {
        let mut doc = StoreDocument::default();
        let err = doc.update(42, &fields("a")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Store);
    }

    #[test]
    fn test_query_tags_filters_by_key() {
        let mut doc = StoreDocument::default();
        let id = doc.create(&fields("a"));
        doc.attach_tag(id, IDENTITY_TAG_KEY, "A-1").unwrap();
        doc.attach_tag(id, "other", "x").unwrap();

        let tags = doc.query_tags(IDENTITY_TAG_KEY);
        assert_eq!(
            tags,
            vec![IdentityTag {
                local_id: id,
                external_id: "A-1".to_string()
            }]
        );
    }
}
