//! `itemvault-auth` — identity resolution and the email-allowlist gate.
//!
//! This crate is decoupled from HTTP and storage: the document store and the
//! identity provider are reached only through the traits in [`provider`].

pub mod allowlist;
pub mod claims;
pub mod credentials;
pub mod event;
pub mod hs256;
pub mod provider;
pub mod resolver;

pub use allowlist::{
    AllowedEmails, AllowlistGate, AllowlistSource, EnvAllowlist, GateError, GateErrorKind,
    StaticAllowlist,
};
pub use claims::{TokenClaims, TokenKind, TokenValidationError, validate_claims};
pub use credentials::{Credential, CredentialBundle};
pub use event::{EventType, LifecycleEvent, UserRecord};
pub use hs256::Hs256IdentityProvider;
pub use provider::{
    ApiKeyDirectory, ApiKeyRecord, DirectoryError, IdentityProvider, ProviderError, VerifiedToken,
};
pub use resolver::{AuthError, IdentityResolver};
