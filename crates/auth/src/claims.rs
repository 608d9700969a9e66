use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which kind of credential a signed token was minted as.
///
/// ID tokens and session cookies share a signing key, so the kind is carried
/// in the issuer to stop one being replayed as the other.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    IdToken,
    SessionCookie,
    /// Signs the provider's own calls to the blocking hooks.
    HookInvocation,
}

impl TokenKind {
    pub fn issuer(&self, project_id: &str) -> String {
        match self {
            TokenKind::IdToken => format!("https://securetoken.itemvault.dev/{project_id}"),
            TokenKind::SessionCookie => format!("https://session.itemvault.dev/{project_id}"),
            TokenKind::HookInvocation => format!("https://hooks.itemvault.dev/{project_id}"),
        }
    }
}

/// Claims carried by ID tokens and session cookies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the tenant uid.
    pub sub: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub iss: String,

    /// Audience: the project id.
    pub aud: String,

    /// Issued-at (seconds since epoch).
    pub iat: i64,

    /// Expiration (seconds since epoch).
    pub exp: i64,
}

impl TokenClaims {
    pub fn issued_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.iat, 0).single().unwrap_or_default()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_default()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of decoded claims.
///
/// `leeway` widens the window on both ends (`iat` and `exp`).
///
/// Signature verification happens before this, in the provider.
pub fn validate_claims(
    claims: &TokenClaims,
    now: DateTime<Utc>,
    leeway: chrono::Duration,
) -> Result<(), TokenValidationError> {
    let issued_at = claims.issued_at();
    let expires_at = claims.expires_at();
    if expires_at <= issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now + leeway < issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= expires_at + leeway {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
