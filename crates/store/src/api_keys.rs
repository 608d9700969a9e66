//! API-key directory backed by the `api_keys` collection.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use itemvault_auth::{ApiKeyDirectory, ApiKeyRecord, DirectoryError};
use itemvault_core::{DocumentPath, Uid};

use crate::document::{Document, DocumentStore, StoreError};

#[derive(Clone)]
pub struct StoreApiKeyDirectory {
    store: Arc<dyn DocumentStore>,
}

impl StoreApiKeyDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Map `key` to `uid` (dev seeding and admin tooling).
    pub async fn register(&self, key: &str, uid: &Uid, name: &str) -> Result<(), StoreError> {
        let path = DocumentPath::api_key(key).map_err(|e| StoreError::InvalidPath(e.to_string()))?;
        let mut data = Document::new();
        data.insert("uid".into(), Value::String(uid.to_string()));
        data.insert("name".into(), Value::String(name.to_string()));
        data.insert("created_at".into(), Value::String(Utc::now().to_rfc3339()));
        self.store.set(&path, data).await?;
        tracing::info!(uid = %uid, key_name = name, "registered API key");
        Ok(())
    }
}

#[async_trait]
impl ApiKeyDirectory for StoreApiKeyDirectory {
    async fn lookup(&self, key: &str) -> Result<Option<ApiKeyRecord>, DirectoryError> {
        // A key that cannot even form a path cannot exist.
        let Ok(path) = DocumentPath::api_key(key) else {
            return Ok(None);
        };

        let Some(doc) = self
            .store
            .get(&path)
            .await
            .map_err(|e| DirectoryError::Backend(e.to_string()))?
        else {
            return Ok(None);
        };

        let field = |name: &str| doc.data.get(name).and_then(Value::as_str).map(str::to_string);
        Ok(Some(ApiKeyRecord {
            uid: field("uid"),
            name: field("name"),
            created_at: field("created_at")
                .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
                .map(|t| t.with_timezone(&Utc)),
        }))
    }
}
