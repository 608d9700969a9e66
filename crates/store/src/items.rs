//! Tenant-scoped item repository (`users/{uid}/items/{id}`).
//!
//! Every method takes the resolved uid and builds paths from it alone; there
//! is no way to address another tenant's items through this type.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use itemvault_core::{DocumentPath, ItemId, Uid};

use crate::document::{Document, DocumentStore, StoreError, StoredDocument};

/// Fields owned by the service; stripped from client payloads.
pub const RESERVED_FIELDS: [&str; 4] = ["id", "owner_id", "created_at", "updated_at"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub owner_id: Uid,
    #[serde(flatten)]
    pub fields: Document,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ItemRepository {
    store: Arc<dyn DocumentStore>,
}

fn client_fields(mut payload: Document) -> Document {
    for field in RESERVED_FIELDS {
        if payload.remove(field).is_some() {
            tracing::debug!(field, "dropped reserved field from item payload");
        }
    }
    payload
}

fn to_item(uid: &Uid, doc: StoredDocument) -> Result<Item, StoreError> {
    let id = ItemId::new(doc.id).map_err(|e| StoreError::InvalidPath(e.to_string()))?;
    Ok(Item {
        id,
        owner_id: uid.clone(),
        fields: client_fields(doc.data),
        created_at: doc.create_time,
        updated_at: doc.update_time,
    })
}

impl ItemRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Store a new item under a generated id.
    pub async fn create(&self, uid: &Uid, payload: Document) -> Result<Item, StoreError> {
        let id = ItemId::generate();
        let mut data = client_fields(payload);
        data.insert("owner_id".into(), Value::String(uid.to_string()));

        let doc = self.store.set(&DocumentPath::item(uid, &id), data).await?;
        tracing::info!(uid = %uid, item_id = %id, "item created");
        to_item(uid, doc)
    }

    pub async fn get(&self, uid: &Uid, id: &ItemId) -> Result<Option<Item>, StoreError> {
        match self.store.get(&DocumentPath::item(uid, id)).await? {
            Some(doc) => Ok(Some(to_item(uid, doc)?)),
            None => Ok(None),
        }
    }

    pub async fn list(&self, uid: &Uid) -> Result<Vec<Item>, StoreError> {
        self.store
            .list(&DocumentPath::items_of(uid))
            .await?
            .into_iter()
            .map(|doc| to_item(uid, doc))
            .collect()
    }

    /// Merge fields into an item, creating it if it does not exist yet.
    pub async fn update(&self, uid: &Uid, id: &ItemId, fields: Document) -> Result<Item, StoreError> {
        let mut data = client_fields(fields);
        data.insert("owner_id".into(), Value::String(uid.to_string()));

        let doc = self.store.merge(&DocumentPath::item(uid, id), data).await?;
        tracing::info!(uid = %uid, item_id = %id, "item updated");
        to_item(uid, doc)
    }

    pub async fn delete(&self, uid: &Uid, id: &ItemId) -> Result<(), StoreError> {
        self.store.delete(&DocumentPath::item(uid, id)).await?;
        tracing::info!(uid = %uid, item_id = %id, "item deleted");
        Ok(())
    }
}
