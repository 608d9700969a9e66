//! `itemvault-core` — shared identifiers, document paths and the domain error model.
//!
//! This crate has no IO; storage and identity live in their own crates.

pub mod error;
pub mod id;
pub mod path;

pub use error::{DomainError, DomainResult};
pub use id::{ItemId, Uid};
pub use path::DocumentPath;
