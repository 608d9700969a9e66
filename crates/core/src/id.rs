//! Strongly-typed identifiers used across the workspace.
//!
//! Both identifiers end up as segments of a document path, so they are
//! validated once at construction: non-empty and free of `/`.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Tenant identity: the uid every item operation is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uid(String);

/// Identifier of an item document inside a tenant's collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

fn validate_segment(name: &str, raw: &str) -> Result<(), DomainError> {
    if raw.trim().is_empty() {
        return Err(DomainError::invalid_id(format!("{name}: must not be empty")));
    }
    if raw.contains('/') {
        return Err(DomainError::invalid_id(format!("{name}: must not contain '/'")));
    }
    Ok(())
}

macro_rules! impl_segment_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn new(raw: impl Into<String>) -> Result<Self, DomainError> {
                let raw = raw.into();
                validate_segment($name, &raw)?;
                Ok(Self(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_segment_newtype!(Uid, "Uid");
impl_segment_newtype!(ItemId, "ItemId");

impl ItemId {
    /// Generate a fresh, time-ordered item id (UUIDv7, hyphen-free).
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }
}
