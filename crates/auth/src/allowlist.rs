//! Email-allowlist gate for the identity provider's blocking hooks.
//!
//! Fail-closed: a missing or empty allowlist denies every event. An operator
//! mistake must never turn into "allow all".

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use crate::event::{EventType, LifecycleEvent};

/// Environment variable (or mounted secret) holding the comma-separated allowlist.
pub const DEFAULT_ALLOWLIST_VAR: &str = "AUTH_ALLOWED_EMAILS";

/// Parsed allowlist: trimmed, lower-cased, blank entries dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedEmails(BTreeSet<String>);

impl AllowedEmails {
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        )
    }

    /// Case-insensitive membership.
    pub fn contains(&self, email: &str) -> bool {
        self.0.contains(&email.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Where the raw allowlist string comes from.
pub trait AllowlistSource: Send + Sync {
    /// Current raw value, `None` when unset.
    fn load(&self) -> Option<String>;
}

/// Reads the allowlist from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvAllowlist {
    var: String,
}

impl EnvAllowlist {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvAllowlist {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWLIST_VAR)
    }
}

impl AllowlistSource for EnvAllowlist {
    fn load(&self) -> Option<String> {
        std::env::var(&self.var).ok()
    }
}

/// Fixed allowlist value (tests, or configuration resolved at startup).
#[derive(Debug, Clone, Default)]
pub struct StaticAllowlist(Option<String>);

impl StaticAllowlist {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Some(raw.into()))
    }

    pub fn unset() -> Self {
        Self(None)
    }
}

impl AllowlistSource for StaticAllowlist {
    fn load(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Machine-readable denial kind, as understood by the identity provider.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GateErrorKind {
    InvalidArgument,
    Internal,
    PermissionDenied,
}

impl GateErrorKind {
    /// Lower-kebab code (`permission-denied`).
    pub fn as_str(&self) -> &'static str {
        match self {
            GateErrorKind::InvalidArgument => "invalid-argument",
            GateErrorKind::Internal => "internal",
            GateErrorKind::PermissionDenied => "permission-denied",
        }
    }

    /// Upper-snake status used in the provider's error envelope (`PERMISSION_DENIED`).
    pub fn status(&self) -> &'static str {
        match self {
            GateErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            GateErrorKind::Internal => "INTERNAL",
            GateErrorKind::PermissionDenied => "PERMISSION_DENIED",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            GateErrorKind::InvalidArgument => 400,
            GateErrorKind::Internal => 500,
            GateErrorKind::PermissionDenied => 403,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("Email address is required.")]
    MissingEmail,

    #[error("Configuration error: the allowed-emails list is missing or empty.")]
    MisconfiguredAllowlist,

    #[error("Email not allowed.")]
    EmailNotAllowed,
}

impl GateError {
    pub fn kind(&self) -> GateErrorKind {
        match self {
            GateError::MissingEmail => GateErrorKind::InvalidArgument,
            GateError::MisconfiguredAllowlist => GateErrorKind::Internal,
            GateError::EmailNotAllowed => GateErrorKind::PermissionDenied,
        }
    }
}

#[derive(Clone)]
pub struct AllowlistGate {
    source: Arc<dyn AllowlistSource>,
}

impl AllowlistGate {
    pub fn new(source: Arc<dyn AllowlistSource>) -> Self {
        Self { source }
    }

    /// Allow or deny a lifecycle event. The event itself is never modified.
    pub fn check(&self, event: &LifecycleEvent) -> Result<(), GateError> {
        let event_type = event.event_type.as_ref().map(EventType::as_str);
        let event_id = event.event_id.as_deref();
        let uid = event.uid();

        let Some(email) = event.email() else {
            tracing::warn!(?event_type, ?event_id, ?uid, "blocking auth: missing email");
            return Err(GateError::MissingEmail);
        };
        let email = email.to_lowercase();

        let allowed = self
            .source
            .load()
            .map(|raw| AllowedEmails::parse(&raw))
            .unwrap_or_default();
        if allowed.is_empty() {
            tracing::error!(
                ?event_type,
                ?event_id,
                ?uid,
                "blocking auth: allowed-emails configuration missing or empty"
            );
            return Err(GateError::MisconfiguredAllowlist);
        }

        if !allowed.contains(&email) {
            tracing::warn!(?event_type, ?event_id, ?uid, %email, "blocking auth: email not allowed");
            return Err(GateError::EmailNotAllowed);
        }

        tracing::info!(
            ?event_type,
            ?uid,
            allowed_count = allowed.len(),
            "blocking auth: allowlist check passed"
        );
        Ok(())
    }
}
