//! Self-hosted identity provider signing ID tokens and session cookies with HS256.
//!
//! Used for local development and tests, and anywhere the service owns its
//! own token issuance. A managed provider plugs in through the same
//! [`IdentityProvider`] trait.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};

use itemvault_core::Uid;

use crate::claims::{TokenClaims, TokenKind, TokenValidationError, validate_claims};
use crate::provider::{IdentityProvider, ProviderError, VerifiedToken};

/// Allowed clock skew when checking `iat`/`exp`, in seconds.
const LEEWAY_SECS: i64 = 30;

/// Session cookies must live between 5 minutes and 14 days.
const MIN_SESSION_TTL_SECS: i64 = 5 * 60;
const MAX_SESSION_TTL_SECS: i64 = 14 * 24 * 60 * 60;

const ID_TOKEN_TTL_SECS: i64 = 60 * 60;

const HOOK_TOKEN_TTL_SECS: i64 = 5 * 60;

/// Subject of hook invocation tokens.
pub const HOOK_CALLER: &str = "identity-provider";

pub struct Hs256IdentityProvider {
    project_id: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl core::fmt::Debug for Hs256IdentityProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256IdentityProvider")
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl Hs256IdentityProvider {
    pub fn new(secret: &[u8], project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Mint a one-hour ID token for `uid`.
    pub fn mint_id_token(&self, uid: &Uid, email: Option<&str>) -> Result<String, ProviderError> {
        self.sign(
            TokenKind::IdToken,
            uid.as_str(),
            email.map(str::to_string),
            Duration::seconds(ID_TOKEN_TTL_SECS),
        )
    }

    /// Mint a short-lived token authorizing one blocking-hook call.
    pub fn mint_hook_token(&self) -> Result<String, ProviderError> {
        self.sign(
            TokenKind::HookInvocation,
            HOOK_CALLER,
            None,
            Duration::seconds(HOOK_TOKEN_TTL_SECS),
        )
    }

    fn sign(
        &self,
        kind: TokenKind,
        sub: &str,
        email: Option<String>,
        ttl: Duration,
    ) -> Result<String, ProviderError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: sub.to_string(),
            email,
            iss: kind.issuer(&self.project_id),
            aud: self.project_id.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ProviderError::Backend(e.to_string()))
    }

    fn verify(&self, kind: TokenKind, token: &str) -> Result<VerifiedToken, ProviderError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[kind.issuer(&self.project_id)]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = LEEWAY_SECS as u64;

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => ProviderError::Expired,
                _ => ProviderError::Invalid(e.to_string()),
            })?;
        let claims = data.claims;

        validate_claims(&claims, Utc::now(), Duration::seconds(LEEWAY_SECS)).map_err(|e| match e {
            TokenValidationError::Expired => ProviderError::Expired,
            other => ProviderError::Invalid(other.to_string()),
        })?;

        let uid = Uid::new(claims.sub.clone()).map_err(|e| ProviderError::Invalid(e.to_string()))?;

        Ok(VerifiedToken {
            uid,
            email: claims.email.clone(),
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
        })
    }
}

#[async_trait]
impl IdentityProvider for Hs256IdentityProvider {
    async fn verify_id_token(&self, token: &str) -> Result<VerifiedToken, ProviderError> {
        self.verify(TokenKind::IdToken, token)
    }

    async fn create_session_cookie(&self, id_token: &str, ttl: Duration) -> Result<String, ProviderError> {
        if ttl.num_seconds() < MIN_SESSION_TTL_SECS || ttl.num_seconds() > MAX_SESSION_TTL_SECS {
            return Err(ProviderError::Invalid(format!(
                "session duration must be between 5 minutes and 14 days, got {}s",
                ttl.num_seconds()
            )));
        }
        let verified = self.verify(TokenKind::IdToken, id_token)?;
        self.sign(TokenKind::SessionCookie, verified.uid.as_str(), verified.email, ttl)
    }

    async fn verify_session_cookie(&self, cookie: &str) -> Result<VerifiedToken, ProviderError> {
        self.verify(TokenKind::SessionCookie, cookie)
    }

    async fn verify_hook_token(&self, token: &str) -> Result<(), ProviderError> {
        let verified = self.verify(TokenKind::HookInvocation, token)?;
        if verified.uid.as_str() != HOOK_CALLER {
            return Err(ProviderError::Invalid(format!(
                "unexpected hook caller '{}'",
                verified.uid
            )));
        }
        Ok(())
    }
}
