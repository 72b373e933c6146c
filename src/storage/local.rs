//! Local filesystem storage implementation.
//!
//! Keeps the whole store in one JSON document and rewrites it atomically on
//! every mutation. Suited to single-site deployments and testing.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── store.json    # records, identity tags, id counter
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{ContentRecord, IdentityTag, LocalId, RecordFields, RecordTimestamps};
use crate::storage::{ContentStore, STORE_DOCUMENT, StoreDocument};

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    // Serialises read-modify-write cycles on the document.
    lock: Arc<Mutex<()>>,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Location of the store document.
    pub fn document_path(&self) -> PathBuf {
        self.root_dir.join(STORE_DOCUMENT)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        let path = self.document_path();
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read the document, returning an empty one if the file doesn't exist.
    async fn read_document(&self) -> Result<StoreDocument> {
        match tokio::fs::read(self.document_path()).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| AppError::store("read", format!("corrupt store document: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreDocument::default()),
            Err(e) => Err(AppError::store("read", e)),
        }
    }

    async fn write_document(&self, operation: &str, doc: &StoreDocument) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        self.write_bytes(&bytes)
            .await
            .map_err(|e| AppError::store(operation, e))
    }

    /// All records currently in the store, ordered by id.
    pub async fn list_records(&self) -> Result<Vec<ContentRecord>> {
        let doc = self.read_document().await?;
        Ok(doc.records.into_values().collect())
    }
}

#[async_trait]
impl ContentStore for LocalStorage {
    async fn query_tags(&self, key: &str) -> Result<Vec<IdentityTag>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.query_tags(key))
    }

    async fn create(&self, fields: &RecordFields) -> Result<LocalId> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?;
        let id = doc.create(fields);
        self.write_document("create", &doc).await?;
        log::debug!("Created record {} in {}", id, self.document_path().display());
        Ok(id)
    }

    async fn update(&self, id: LocalId, fields: &RecordFields) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?;
        doc.update(id, fields)?;
        self.write_document("update", &doc).await
    }

    async fn attach_tag(&self, id: LocalId, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?;
        doc.attach_tag(id, key, value)?;
        self.write_document("attach_tag", &doc).await
    }

    async fn get_timestamps(&self, id: LocalId) -> Result<Option<RecordTimestamps>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.timestamps(id))
    }

    async fn get(&self, id: LocalId) -> Result<Option<ContentRecord>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.records.remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostStatus;
    use crate::storage::IDENTITY_TAG_KEY;
    use tempfile::TempDir;

    fn fields(title: &str) -> RecordFields {
        RecordFields {
            title: title.to_string(),
            body: "body".to_string(),
            excerpt: "excerpt".to_string(),
            status: PostStatus::Publish,
            author_id: 3,
            category_id: Some(12),
        }
    }

    #[tokio::test]
    async fn test_empty_store() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert!(storage.query_tags(IDENTITY_TAG_KEY).await.unwrap().is_empty());
        assert!(storage.get(1).await.unwrap().is_none());
        assert!(!storage.document_path().exists());
    }

    #[tokio::test]
    async fn test_create_tag_and_reload() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let id = storage.create(&fields("First")).await.unwrap();
        storage
            .attach_tag(id, IDENTITY_TAG_KEY, "ART-1")
            .await
            .unwrap();

        // A fresh handle sees the persisted state.
        let reopened = LocalStorage::new(tmp.path());
        let tags = reopened.query_tags(IDENTITY_TAG_KEY).await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].local_id, id);
        assert_eq!(tags[0].external_id, "ART-1");

        let record = reopened.get(id).await.unwrap().unwrap();
        assert_eq!(record.fields, fields("First"));
        assert_eq!(record.created_at, record.modified_at);
    }

    #[tokio::test]
    async fn test_update_changes_fields() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let id = storage.create(&fields("Old")).await.unwrap();
        storage.update(id, &fields("New")).await.unwrap();

        let records = storage.list_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields.title, "New");
    }

    #[tokio::test]
    async fn test_attach_tag_to_missing_record_fails() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let err = storage
            .attach_tag(9, IDENTITY_TAG_KEY, "ART-9")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Store { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_document_is_store_error() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        std::fs::write(storage.document_path(), b"{ not json").unwrap();

        let err = storage.query_tags(IDENTITY_TAG_KEY).await.unwrap_err();
        assert!(matches!(err, AppError::Store { .. }));
    }
}
