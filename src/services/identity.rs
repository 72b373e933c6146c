//! Identity index.
//!
//! Maps external article ids to the local records created from them. Built
//! once per run from a single tag query.

use std::collections::HashMap;

use crate::error::Result;
use crate::models::LocalId;
use crate::storage::{ContentStore, IDENTITY_TAG_KEY};

/// Run-scoped `external id -> local id` lookup.
#[derive(Debug, Clone, Default)]
pub struct IdentityIndex {
    entries: HashMap<String, LocalId>,
}

impl IdentityIndex {
    /// Build the index from every identity tag in the store.
    ///
    /// If the store holds several tags for one external id the lowest local
    /// id wins, so lookups stay stable across runs.
    pub async fn build(store: &dyn ContentStore) -> Result<Self> {
        let tags = store.query_tags(IDENTITY_TAG_KEY).await?;
        let mut entries: HashMap<String, LocalId> = HashMap::with_capacity(tags.len());

        for tag in tags {
            entries
                .entry(tag.external_id)
                .and_modify(|id| *id = (*id).min(tag.local_id))
                .or_insert(tag.local_id);
        }

        log::debug!("Identity index built with {} entries", entries.len());
        Ok(Self { entries })
    }

    pub fn lookup(&self, external_id: &str) -> Option<LocalId> {
        self.entries.get(external_id).copied()
    }

    /// Remember a record created during the current run.
    pub fn record(&mut self, external_id: impl Into<String>, local_id: LocalId) {
        self.entries.insert(external_id.into(), local_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_build_from_tags() {
        let store = MemoryStorage::new();
        store.insert_tag(1, IDENTITY_TAG_KEY, "A").await;
        store.insert_tag(2, IDENTITY_TAG_KEY, "B").await;
        store.insert_tag(3, "unrelated", "C").await;

        let index = IdentityIndex::build(&store).await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup("A"), Some(1));
        assert_eq!(index.lookup("B"), Some(2));
        assert_eq!(index.lookup("C"), None);
    }

    #[tokio::test]
    async fn test_duplicate_tags_resolve_to_lowest_id() {
        let store = MemoryStorage::new();
        store.insert_tag(9, IDENTITY_TAG_KEY, "A").await;
        store.insert_tag(4, IDENTITY_TAG_KEY, "A").await;

        let index = IdentityIndex::build(&store).await.unwrap();
        assert_eq!(index.lookup("A"), Some(4));
    }

    #[tokio::test]
    async fn test_record_new_entry() {
        let store = MemoryStorage::new();
        let mut index = IdentityIndex::build(&store).await.unwrap();
        assert!(index.is_empty());

        index.record("X", 7);
        assert_eq!(index.lookup("X"), Some(7));
    }
}
