//! Storage layer: document store seam, in-memory implementation, and the
//! tenant-scoped repositories built on top of it.

pub mod api_keys;
pub mod document;
pub mod items;
pub mod memory;

pub use api_keys::StoreApiKeyDirectory;
pub use document::{Document, DocumentStore, StoreError, StoredDocument};
pub use items::{Item, ItemRepository, RESERVED_FIELDS};
pub use memory::InMemoryDocumentStore;
