//! Document store port.
//!
//! The store is an opaque keyed-record service: collections of JSON documents
//! addressed by string id, with equality, array-contains and time-range
//! filters. Creation timestamps are assigned by the store.
//!
//! # Example
//!
//! ```ignore
//! let stored = store
//!     .put(&Collection::Complaints, complaint_id.as_str(), body, false)
//!     .await?;
//! let mine = store
//!     .query(&Collection::Complaints, &[Filter::eq("senderId", actor.id.as_str())])
//!     .await?;
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use crate::domain::foundation::{GroupId, Timestamp};

/// A document body: a JSON object.
pub type Document = Map<String, Value>;

/// Named collections used by GroupDesk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Groups,
    Complaints,
    /// Messages of one group's chat.
    ChatMessages(GroupId),
    DailyMessageCounts,
}

impl Collection {
    /// Store path of this collection.
    pub fn path(&self) -> String {
        match self {
            Collection::Users => "users".to_string(),
            Collection::Groups => "groups".to_string(),
            Collection::Complaints => "complaints".to_string(),
            Collection::ChatMessages(group_id) => format!("chats/{}/messages", group_id),
            Collection::DailyMessageCounts => "daily_message_counts".to_string(),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// A document as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub body: Document,
    /// Assigned on first write, preserved afterwards.
    pub created_at: Timestamp,
}

impl StoredDocument {
    /// Deserializes the body into a record type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(Value::Object(self.body.clone())).map_err(|e| {
            StoreError::InvalidDocument {
                id: self.id.clone(),
                reason: e.to_string(),
            }
        })
    }
}

/// Serializes a record into a document body.
pub fn encode<T: Serialize>(record: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::Serialization(format!(
            "expected a JSON object, got {}",
            other
        ))),
        Err(e) => Err(StoreError::Serialization(e.to_string())),
    }
}

/// Query filter. All filters of a query must match.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `field == value`
    Eq { field: String, value: Value },
    /// `field` is an array containing `value`.
    ArrayContains { field: String, value: Value },
    /// `from <= field < until`, with `field` holding an RFC 3339 string.
    TimeRange {
        field: String,
        from: Timestamp,
        until: Timestamp,
    },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn array_contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::ArrayContains {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn time_range(field: impl Into<String>, from: Timestamp, until: Timestamp) -> Self {
        Filter::TimeRange {
            field: field.into(),
            from,
            until,
        }
    }

    /// Evaluates the filter against a document body.
    pub fn matches(&self, body: &Document) -> bool {
        match self {
            Filter::Eq { field, value } => body.get(field) == Some(value),
            Filter::ArrayContains { field, value } => body
                .get(field)
                .and_then(Value::as_array)
                .map(|items| items.contains(value))
                .unwrap_or(false),
            Filter::TimeRange { field, from, until } => body
                .get(field)
                .and_then(Value::as_str)
                .and_then(Timestamp::parse_rfc3339)
                .map(|ts| ts >= *from && ts < *until)
                .unwrap_or(false),
        }
    }
}

/// Store failures.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// A concurrent writer changed the document; the caller may retry.
    #[error("Concurrent modification of {collection}/{id}")]
    Conflict { collection: String, id: String },

    #[error("Document {id} is malformed: {reason}")]
    InvalidDocument { id: String, reason: String },

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    pub fn not_found(collection: &Collection, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            collection: collection.path(),
            id: id.into(),
        }
    }

    pub fn conflict(collection: &Collection, id: impl Into<String>) -> Self {
        StoreError::Conflict {
            collection: collection.path(),
            id: id.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Keyed document persistence.
///
/// Implementations must make every single-document method atomic.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document.
    async fn get(
        &self,
        collection: &Collection,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError>;

    /// Fetch every document matching all `filters`. Order is unspecified.
    async fn query(
        &self,
        collection: &Collection,
        filters: &[Filter],
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Write a document.
    ///
    /// With `merge`, top-level fields of `body` are merged into an existing
    /// document; otherwise the body replaces it. Returns the stored document.
    async fn put(
        &self,
        collection: &Collection,
        id: &str,
        body: Document,
        merge: bool,
    ) -> Result<StoredDocument, StoreError>;

    /// Merge `body` into an existing document only while `field` still holds
    /// `expected`. A missing field reads as `null`.
    ///
    /// Returns false, writing nothing, when the document is missing or the
    /// field no longer matches. Callers use this for optimistic concurrency:
    /// read, change, then write back guarded by the value they read.
    async fn merge_if(
        &self,
        collection: &Collection,
        id: &str,
        field: &str,
        expected: &Value,
        body: Document,
    ) -> Result<bool, StoreError>;

    /// Remove a document. Returns false if it did not exist.
    async fn delete(&self, collection: &Collection, id: &str) -> Result<bool, StoreError>;

    /// Atomically append `value` to the array `field` unless already present.
    ///
    /// Returns true if the value was added.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the document does not exist
    /// - `Conflict` if a concurrent writer interfered
    async fn add_to_set(
        &self,
        collection: &Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn body(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn chat_collection_path_is_nested_under_group() {
        let path = Collection::ChatMessages(GroupId::new("G1").unwrap()).path();
        assert_eq!(path, "chats/G1/messages");
    }

    #[test]
    fn eq_and_array_contains_filters() {
        let doc = body(json!({"role": "student", "studentIds": ["U1", "U2"]}));
        assert!(Filter::eq("role", "student").matches(&doc));
        assert!(!Filter::eq("role", "admin").matches(&doc));
        assert!(Filter::array_contains("studentIds", "U2").matches(&doc));
        assert!(!Filter::array_contains("studentIds", "U3").matches(&doc));
        assert!(!Filter::array_contains("role", "student").matches(&doc));
    }

    #[test]
    fn time_range_is_half_open() {
        let from = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let until = from.plus_secs(86_400);
        let filter = Filter::time_range("timestamp", from, until);

        assert!(filter.matches(&body(json!({"timestamp": "2024-01-01T00:00:00Z"}))));
        assert!(filter.matches(&body(json!({"timestamp": "2024-01-01T23:59:59Z"}))));
        assert!(!filter.matches(&body(json!({"timestamp": "2024-01-02T00:00:00Z"}))));
        assert!(!filter.matches(&body(json!({"timestamp": "garbage"}))));
    }

    #[test]
    fn encode_rejects_non_objects() {
        assert!(encode(&json!({"a": 1})).is_ok());
        assert!(matches!(encode(&5), Err(StoreError::Serialization(_))));
    }

    #[test]
    fn decode_reports_document_id() {
        let stored = StoredDocument {
            id: "d1".to_string(),
            body: body(json!({"count": "not a number"})),
            created_at: Timestamp::now(),
        };

        #[derive(Debug, serde::Deserialize)]
        struct Row {
            #[allow(dead_code)]
            count: u64,
        }

        let err = stored.decode::<Row>().unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument { ref id, .. } if id == "d1"));
    }
}
