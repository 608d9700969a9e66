use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use itemvault_core::DocumentPath;

/// Document body: a JSON object.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// A document as returned by the store, with server-assigned timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Last path segment.
    pub id: String,
    pub data: Document,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A document operation was given a collection path or vice versa.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("document store unavailable: {0}")]
    Backend(String),
}

/// Hierarchical document store (collections of documents, documents holding
/// sub-collections).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &DocumentPath) -> Result<Option<StoredDocument>, StoreError>;

    /// Create or overwrite the document.
    async fn set(&self, path: &DocumentPath, data: Document) -> Result<StoredDocument, StoreError>;

    /// Merge `fields` into the document, creating it if absent.
    async fn merge(&self, path: &DocumentPath, fields: Document) -> Result<StoredDocument, StoreError>;

    /// Delete the document. Deleting a missing document is not an error.
    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError>;

    /// Direct children of a collection, ordered by id.
    async fn list(&self, collection: &DocumentPath) -> Result<Vec<StoredDocument>, StoreError>;
}
