//! In-memory document store.
//!
//! Backs development runs and tests. Every method takes the collection lock
//! for its whole duration, so single-document operations are atomic.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{btree_map, BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::{Collection, Document, DocumentStore, Filter, StoreError, StoredDocument};

#[derive(Debug, Clone)]
struct Record {
    body: Document,
    created_at: Timestamp,
}

impl Record {
    fn to_stored(&self, id: &str) -> StoredDocument {
        StoredDocument {
            id: id.to_string(),
            body: self.body.clone(),
            created_at: self.created_at,
        }
    }
}

/// In-memory implementation of [`DocumentStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, BTreeMap<String, Record>>>>,
    unavailable: Arc<RwLock<HashSet<String>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a document with an explicit creation time (useful for tests that
    /// depend on ordering).
    pub async fn put_with_created_at(
        &self,
        collection: &Collection,
        id: &str,
        body: Document,
        created_at: Timestamp,
    ) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.path())
            .or_default()
            .insert(id.to_string(), Record { body, created_at });
    }

    /// Make every query against `collection` fail with `Unavailable`.
    pub async fn make_unavailable(&self, collection: &Collection) {
        self.unavailable.write().await.insert(collection.path());
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection.path())
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Clear all stored data.
    pub async fn clear(&self) {
        self.collections.write().await.clear();
        self.unavailable.write().await.clear();
    }

    async fn ensure_available(&self, collection: &Collection) -> Result<(), StoreError> {
        if self.unavailable.read().await.contains(&collection.path()) {
            return Err(StoreError::Unavailable(format!(
                "{} is unavailable",
                collection
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(
        &self,
        collection: &Collection,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        self.ensure_available(collection).await?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection.path())
            .and_then(|docs| docs.get(id))
            .map(|entry| entry.to_stored(id)))
    }

    async fn query(
        &self,
        collection: &Collection,
        filters: &[Filter],
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.ensure_available(collection).await?;
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(&collection.path()) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .filter(|(_, entry)| filters.iter().all(|f| f.matches(&entry.body)))
            .map(|(id, entry)| entry.to_stored(id))
            .collect())
    }

    async fn put(
        &self,
        collection: &Collection,
        id: &str,
        body: Document,
        merge: bool,
    ) -> Result<StoredDocument, StoreError> {
        self.ensure_available(collection).await?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.path()).or_default();

        let stored = match docs.entry(id.to_string()) {
            btree_map::Entry::Occupied(mut occupied) => {
                let existing = occupied.get_mut();
                if merge {
                    existing.body.extend(body);
                } else {
                    existing.body = body;
                }
                existing.to_stored(id)
            }
            btree_map::Entry::Vacant(vacant) => vacant
                .insert(Record {
                    body,
                    created_at: Timestamp::now(),
                })
                .to_stored(id),
        };
        Ok(stored)
    }

    async fn merge_if(
        &self,
        collection: &Collection,
        id: &str,
        field: &str,
        expected: &Value,
        body: Document,
    ) -> Result<bool, StoreError> {
        self.ensure_available(collection).await?;
        let mut collections = self.collections.write().await;
        let Some(entry) = collections
            .get_mut(&collection.path())
            .and_then(|docs| docs.get_mut(id))
        else {
            return Ok(false);
        };

        if entry.body.get(field).unwrap_or(&Value::Null) != expected {
            return Ok(false);
        }
        entry.body.extend(body);
        Ok(true)
    }

    async fn delete(&self, collection: &Collection, id: &str) -> Result<bool, StoreError> {
        self.ensure_available(collection).await?;
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(&collection.path())
            .and_then(|docs| docs.remove(id))
            .is_some())
    }

    async fn add_to_set(
        &self,
        collection: &Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<bool, StoreError> {
        self.ensure_available(collection).await?;
        let mut collections = self.collections.write().await;
        let entry = collections
            .get_mut(&collection.path())
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        let slot = entry
            .body
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        let Value::Array(items) = slot else {
            return Err(StoreError::InvalidDocument {
                id: id.to_string(),
                reason: format!("field '{}' is not an array", field),
            });
        };
        if items.contains(&value) {
            return Ok(false);
        }
        items.push(value);
        Ok(true)
    }
}
