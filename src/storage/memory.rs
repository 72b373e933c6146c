//! In-process storage backend.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{ContentRecord, IdentityTag, LocalId, RecordFields, RecordTimestamps};
use crate::storage::{ContentStore, StoreDocument, TagRow};

/// Store held entirely in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    doc: RwLock<StoreDocument>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record as-is, keeping its id and timestamps.
    pub async fn insert_record(&self, record: ContentRecord) {
        let mut doc = self.doc.write().await;
        doc.next_id = doc.next_id.max(record.local_id);
        doc.records.insert(record.local_id, record);
    }

    /// Insert a tag row without checking that the record exists.
    pub async fn insert_tag(&self, local_id: LocalId, key: &str, value: &str) {
        self.doc.write().await.tags.push(TagRow {
            local_id,
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    pub async fn record_count(&self) -> usize {
        self.doc.read().await.records.len()
    }

    pub async fn records(&self) -> Vec<ContentRecord> {
        self.doc.read().await.records.values().cloned().collect()
    }
}

#[async_trait]
impl ContentStore for MemoryStorage {
    async fn query_tags(&self, key: &str) -> Result<Vec<IdentityTag>> {
        Ok(self.doc.read().await.query_tags(key))
    }

    async fn create(&self, fields: &RecordFields) -> Result<LocalId> {
        Ok(self.doc.write().await.create(fields))
    }

    async fn update(&self, id: LocalId, fields: &RecordFields) -> Result<()> {
        self.doc.write().await.update(id, fields)
    }

    async fn attach_tag(&self, id: LocalId, key: &str, value: &str) -> Result<()> {
        self.doc.write().await.attach_tag(id, key, value)
    }

    async fn get_timestamps(&self, id: LocalId) -> Result<Option<RecordTimestamps>> {
        Ok(self.doc.read().await.timestamps(id))
    }

    async fn get(&self, id: LocalId) -> Result<Option<ContentRecord>> {
        Ok(self.doc.read().await.records.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostStatus;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_insert_record_keeps_timestamps_and_ids() {
        let store = MemoryStorage::new();
        let created = Utc::now() - Duration::days(2);
        let modified = created + Duration::hours(1);

        store
            .insert_record(ContentRecord {
                local_id: 40,
                fields: RecordFields {
                    title: "Seeded".into(),
                    body: String::new(),
                    excerpt: String::new(),
                    status: PostStatus::Publish,
                    author_id: 1,
                    category_id: None,
                },
                created_at: created,
                modified_at: modified,
            })
            .await;

        let ts = store.get_timestamps(40).await.unwrap().unwrap();
        assert_eq!(ts.created_at, created);
        assert_eq!(ts.modified_at, modified);

        // New records continue after the seeded id.
        let next = store
            .create(&store.get(40).await.unwrap().unwrap().fields)
            .await
            .unwrap();
        assert_eq!(next, 41);
        assert_eq!(store.record_count().await, 2);
    }
}
