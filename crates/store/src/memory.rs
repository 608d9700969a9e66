use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use itemvault_core::DocumentPath;

use crate::document::{Document, DocumentStore, StoreError, StoredDocument};

/// In-memory document store for tests/dev.
///
/// Keys are full document paths, so tenant isolation comes for free from the
/// path: `users/a/items/x` and `users/b/items/x` never collide.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    inner: RwLock<BTreeMap<DocumentPath, StoredDocument>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn require_document(path: &DocumentPath) -> Result<(), StoreError> {
    if path.is_document() {
        Ok(())
    } else {
        Err(StoreError::InvalidPath(format!("{path} is a collection, not a document")))
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("store lock poisoned".to_string())
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<StoredDocument>, StoreError> {
        require_document(path)?;
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(path).cloned())
    }

    async fn set(&self, path: &DocumentPath, data: Document) -> Result<StoredDocument, StoreError> {
        require_document(path)?;
        let now = Utc::now();
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let create_time = map.get(path).map(|d| d.create_time).unwrap_or(now);
        let doc = StoredDocument {
            id: path.leaf().to_string(),
            data,
            create_time,
            update_time: now,
        };
        map.insert(path.clone(), doc.clone());
        Ok(doc)
    }

    async fn merge(&self, path: &DocumentPath, fields: Document) -> Result<StoredDocument, StoreError> {
        require_document(path)?;
        let now = Utc::now();
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let doc = map.entry(path.clone()).or_insert_with(|| StoredDocument {
            id: path.leaf().to_string(),
            data: Document::new(),
            create_time: now,
            update_time: now,
        });
        doc.data.extend(fields);
        doc.update_time = now;
        Ok(doc.clone())
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError> {
        require_document(path)?;
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.remove(path);
        Ok(())
    }

    async fn list(&self, collection: &DocumentPath) -> Result<Vec<StoredDocument>, StoreError> {
        if collection.is_document() {
            return Err(StoreError::InvalidPath(format!(
                "{collection} is a document, not a collection"
            )));
        }
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .iter()
            .filter(|(path, _)| path.parent().as_ref() == Some(collection))
            .map(|(_, doc)| doc.clone())
            .collect())
    }
}
