//! Identity resolution: credential bundle → tenant uid.
//!
//! Checks run in a fixed order and the first *presented* credential decides:
//!
//! 1. `X-API-KEY` (looked up in the key directory)
//! 2. `Authorization: Bearer` (verified as an ID token)
//! 3. `session` cookie (verified as a signed session cookie)
//!
//! A credential that is present but invalid fails the request immediately; it
//! is never downgraded to "absent" so a later credential can win.

use std::sync::Arc;

use thiserror::Error;

use itemvault_core::Uid;

use crate::credentials::{Credential, CredentialBundle};
use crate::provider::{ApiKeyDirectory, IdentityProvider, ProviderError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("authentication required")]
    MissingCredentials,

    #[error("invalid API key")]
    InvalidApiKey,

    #[error("invalid or expired token")]
    InvalidOrExpiredToken,

    /// The key directory or identity provider failed; not the caller's fault.
    #[error("authentication backend unavailable")]
    Unavailable,
}

impl AuthError {
    /// HTTP status code the API layer maps this error to.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidApiKey => 403,
            AuthError::MissingCredentials | AuthError::InvalidOrExpiredToken => 401,
            AuthError::Unavailable => 503,
        }
    }

    /// Stable machine-readable code for JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "authentication_required",
            AuthError::InvalidApiKey => "invalid_api_key",
            AuthError::InvalidOrExpiredToken => "invalid_token",
            AuthError::Unavailable => "auth_unavailable",
        }
    }
}

#[derive(Clone)]
pub struct IdentityResolver {
    api_keys: Arc<dyn ApiKeyDirectory>,
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityResolver {
    pub fn new(api_keys: Arc<dyn ApiKeyDirectory>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self { api_keys, provider }
    }

    /// Resolve the uid a request acts as.
    pub async fn resolve(&self, credentials: &CredentialBundle) -> Result<Uid, AuthError> {
        match credentials.api_key_slot() {
            Some(Credential::Value(key)) => return self.resolve_api_key(key).await,
            Some(Credential::Unreadable) => {
                tracing::warn!("rejected unreadable API key header");
                return Err(AuthError::InvalidApiKey);
            }
            None => {}
        }

        match credentials.bearer_token_slot() {
            Some(Credential::Value(token)) => {
                return match self.provider.verify_id_token(token).await {
                    Ok(verified) => {
                        tracing::debug!(uid = %verified.uid, "resolved identity from bearer token");
                        Ok(verified.uid)
                    }
                    Err(e) => Err(token_failure("bearer token", e)),
                };
            }
            Some(Credential::Unreadable) => {
                tracing::warn!("rejected unreadable authorization header");
                return Err(AuthError::InvalidOrExpiredToken);
            }
            None => {}
        }

        match credentials.session_cookie_slot() {
            Some(Credential::Value(cookie)) => {
                return match self.provider.verify_session_cookie(cookie).await {
                    Ok(verified) => {
                        tracing::debug!(uid = %verified.uid, "resolved identity from session cookie");
                        Ok(verified.uid)
                    }
                    Err(e) => Err(token_failure("session cookie", e)),
                };
            }
            Some(Credential::Unreadable) => {
                tracing::warn!("rejected unreadable session cookie");
                return Err(AuthError::InvalidOrExpiredToken);
            }
            None => {}
        }

        Err(AuthError::MissingCredentials)
    }

    async fn resolve_api_key(&self, key: &str) -> Result<Uid, AuthError> {
        let record = match self.api_keys.lookup(key).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::warn!("rejected unknown API key");
                return Err(AuthError::InvalidApiKey);
            }
            Err(e) => {
                tracing::error!(error = %e, "API key lookup failed");
                return Err(AuthError::Unavailable);
            }
        };

        let uid = record.uid.as_deref().map(str::trim).filter(|u| !u.is_empty());
        match uid.map(Uid::new) {
            Some(Ok(uid)) => {
                tracing::debug!(uid = %uid, "resolved identity from API key");
                Ok(uid)
            }
            Some(Err(e)) => {
                tracing::error!(error = %e, key_name = ?record.name, "API key record has a malformed uid");
                Err(AuthError::InvalidApiKey)
            }
            None => {
                tracing::error!(key_name = ?record.name, "API key record has no uid");
                Err(AuthError::InvalidApiKey)
            }
        }
    }
}

fn token_failure(source: &'static str, err: ProviderError) -> AuthError {
    match err {
        ProviderError::Backend(detail) => {
            tracing::error!(source, error = %detail, "token verification backend failed");
            AuthError::Unavailable
        }
        other => {
            tracing::warn!(source, error = %other, "token verification failed");
            AuthError::InvalidOrExpiredToken
        }
    }
}
