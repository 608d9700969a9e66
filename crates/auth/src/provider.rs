//! Seams to the external collaborators the resolver depends on.
//!
//! Implementations are constructed once at startup and shared behind `Arc`,
//! so tests can substitute in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use itemvault_core::Uid;

/// Identity extracted from a token the provider has verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub uid: Uid,
    pub email: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Signature, issuer, or claim shape did not check out.
    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("token has expired")]
    Expired,

    /// The provider itself could not be reached or failed.
    #[error("identity provider unavailable: {0}")]
    Backend(String),
}

/// Identity provider contract: verify ID tokens, mint and verify session cookies.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a short-lived ID token presented as `Authorization: Bearer`.
    async fn verify_id_token(&self, token: &str) -> Result<VerifiedToken, ProviderError>;

    /// Exchange a valid ID token for a longer-lived session cookie value.
    async fn create_session_cookie(
        &self,
        id_token: &str,
        ttl: chrono::Duration,
    ) -> Result<String, ProviderError>;

    /// Verify a session cookie previously minted by [`Self::create_session_cookie`].
    async fn verify_session_cookie(&self, cookie: &str) -> Result<VerifiedToken, ProviderError>;

    /// Verify that a blocking-hook call was signed by this provider.
    async fn verify_hook_token(&self, token: &str) -> Result<(), ProviderError>;
}

/// Stored API-key record (`api_keys/{key}`).
///
/// `uid` is optional on the wire: a record without one is a data defect the
/// resolver must reject, not something serde should paper over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("api key directory unavailable: {0}")]
    Backend(String),
}

/// Lookup of API-key records by the raw key string.
#[async_trait]
pub trait ApiKeyDirectory: Send + Sync {
    async fn lookup(&self, key: &str) -> Result<Option<ApiKeyRecord>, DirectoryError>;
}
