//! Hierarchical document paths (`collection/doc/collection/doc/...`).

use crate::{DomainError, DomainResult, ItemId, Uid};

/// Top-level collection holding one document per tenant.
pub const USERS_COLLECTION: &str = "users";

/// Per-tenant sub-collection holding item documents.
pub const ITEMS_COLLECTION: &str = "items";

/// Top-level collection mapping raw API keys to their owning uid.
pub const API_KEYS_COLLECTION: &str = "api_keys";

/// Path of a collection or document, stored as validated segments.
///
/// An even number of segments addresses a document, an odd number a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    /// Root-level collection path.
    pub fn collection(name: &str) -> Self {
        Self {
            segments: vec![name.to_string()],
        }
    }

    /// Append one segment (`doc` under a collection, or a sub-collection under a doc).
    pub fn child(&self, segment: &str) -> DomainResult<Self> {
        if segment.is_empty() || segment.contains('/') {
            return Err(DomainError::invalid_id(format!("invalid path segment '{segment}'")));
        }
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// `users/{uid}/items`, the only collection item routes touch.
    pub fn items_of(uid: &Uid) -> Self {
        Self {
            segments: vec![
                USERS_COLLECTION.to_string(),
                uid.as_str().to_string(),
                ITEMS_COLLECTION.to_string(),
            ],
        }
    }

    /// `users/{uid}/items/{id}`.
    pub fn item(uid: &Uid, id: &ItemId) -> Self {
        let mut path = Self::items_of(uid);
        path.segments.push(id.as_str().to_string());
        path
    }

    /// `api_keys/{key}`.
    pub fn api_key(key: &str) -> DomainResult<Self> {
        Self::collection(API_KEYS_COLLECTION).child(key)
    }

    pub fn is_document(&self) -> bool {
        self.segments.len() % 2 == 0
    }

    /// Parent collection of a document path (`None` for collections).
    pub fn parent(&self) -> Option<Self> {
        if !self.is_document() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Last segment: the document id for document paths.
    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl core::fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}
