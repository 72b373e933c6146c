//! AWS S3 storage implementation.
//!
//! Stores the same document as [`LocalStorage`](super::LocalStorage) as a
//! single object at `{bucket}/{prefix}/store.json`. Every mutation is a
//! read-modify-write of that object, so only one run may target a prefix at
//! a time.

use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use async_trait::async_trait;
use tokio::sync::Mutex;
use log::info;

use crate::error::{AppError, Result};
use crate::models::{ContentRecord, IdentityTag, LocalId, RecordFields, RecordTimestamps};
use crate::storage::{ContentStore, STORE_DOCUMENT, StoreDocument};

/// Default key prefix when `S3_PREFIX` is unset.
pub const DEFAULT_PREFIX: &str = "feedsync";

/// S3-backed content store.
pub struct S3Storage {
    client: Client,
    bucket: String,
    prefix: String,
    lock: Mutex<()>,
}

impl S3Storage {
    /// Create a new S3 storage instance.
    pub fn new(client: Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
            lock: Mutex::new(()),
        }
    }

    /// Create S3 storage from environment configuration.
    pub async fn from_env() -> Result<Self> {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);

        let bucket = std::env::var("S3_BUCKET")
            .map_err(|_| AppError::config("S3_BUCKET is not set"))?;
        let prefix = std::env::var("S3_PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string());

        Ok(Self::new(client, bucket, prefix))
    }

    /// Full object key for `name` under this store's prefix.
    pub fn key(&self, name: &str) -> String {
        object_key(&self.prefix, name)
    }

    /// Read an object, returning None if the key doesn't exist.
    pub async fn read_bytes_optional(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| AppError::S3(e.to_string()))?;
                Ok(Some(bytes.into_bytes().to_vec()))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    info!("No existing object at s3://{}/{}", self.bucket, key);
                    Ok(None)
                } else {
                    Err(AppError::S3(service_err.to_string()))
                }
            }
        }
    }

    async fn read_document(&self) -> Result<StoreDocument> {
        match self.read_bytes_optional(&self.key(STORE_DOCUMENT)).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| AppError::store("read", format!("corrupt store document: {e}"))),
            None => Ok(StoreDocument::default()),
        }
    }

    async fn write_document(&self, operation: &str, doc: &StoreDocument) -> Result<()> {
        let key = self.key(STORE_DOCUMENT);
        let json = serde_json::to_vec_pretty(doc)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(json))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| AppError::store(operation, e))?;

        info!(
            "Wrote {} records to s3://{}/{}",
            doc.records.len(),
            self.bucket,
            key
        );
        Ok(())
    }
}

#[async_trait]
impl ContentStore for S3Storage {
    async fn query_tags(&self, key: &str) -> Result<Vec<IdentityTag>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.query_tags(key))
    }

    async fn create(&self, fields: &RecordFields) -> Result<LocalId> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?;
        let id = doc.create(fields);
        self.write_document("create", &doc).await?;
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

fn object_key(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key() {
        assert_eq!(object_key(DEFAULT_PREFIX, STORE_DOCUMENT), "feedsync/store.json");
        assert_eq!(object_key("/sites/a/", "config.toml"), "sites/a/config.toml");
        assert_eq!(object_key("", "config.toml"), "config.toml");
        assert_eq!(object_key("/", STORE_DOCUMENT), "store.json");
    }
}
