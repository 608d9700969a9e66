use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header, header::AsHeaderName},
    middleware::Next,
    response::Response,
};

use itemvault_auth::{Credential, CredentialBundle, IdentityProvider, IdentityResolver};

use crate::app::errors;
use crate::context::TenantContext;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const SESSION_COOKIE: &str = "session";

#[derive(Clone)]
pub struct AuthState {
    pub resolver: IdentityResolver,
}

#[derive(Clone)]
pub struct HookAuthState {
    pub provider: Arc<dyn IdentityProvider>,
}

/// Resolve the caller's uid and attach it as [`TenantContext`]; reject otherwise.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let credentials = extract_credentials(req.headers());

    match state.resolver.resolve(&credentials).await {
        Ok(uid) => {
            req.extensions_mut().insert(TenantContext::new(uid));
            next.run(req).await
        }
        Err(e) => {
            tracing::info!(
                path = %req.uri().path(),
                error = %e,
                "request rejected by identity resolver"
            );
            errors::auth_error_to_response(&e)
        }
    }
}

/// One log line per request with status and latency.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request completed"
    );
    response
}

/// Verify that a blocking-hook call carries a provider-signed bearer token.
pub async fn hook_auth_middleware(
    State(state): State<HookAuthState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(Credential::Value(token)) = bearer_credential(req.headers()) else {
        tracing::warn!(path = %req.uri().path(), "unsigned blocking hook call rejected");
        return errors::hook_unauthenticated();
    };

    match state.provider.verify_hook_token(&token).await {
        Ok(()) => next.run(req).await,
        Err(e) => {
            tracing::warn!(path = %req.uri().path(), error = %e, "blocking hook signature rejected");
            errors::hook_auth_error_to_response(&e)
        }
    }
}

pub fn extract_credentials(headers: &HeaderMap) -> CredentialBundle {
    CredentialBundle::from_slots(
        header_credential(headers, API_KEY_HEADER),
        bearer_credential(headers),
        cookie_credential(headers, SESSION_COOKIE),
    )
}

fn header_credential<K: AsHeaderName>(headers: &HeaderMap, name: K) -> Option<Credential> {
    let value = headers.get(name)?;
    Some(match value.to_str() {
        Ok(v) => Credential::Value(v.to_string()),
        Err(_) => Credential::Unreadable,
    })
}

/// Token of an `Authorization: Bearer <token>` header. Any other scheme is an
/// unreadable token, not a missing one.
fn bearer_credential(headers: &HeaderMap) -> Option<Credential> {
    let Credential::Value(value) = header_credential(headers, header::AUTHORIZATION)? else {
        return Some(Credential::Unreadable);
    };
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Some(Credential::Unreadable);
    }
    Some(Credential::Value(token.trim().to_string()))
}

/// Cookie `name`, searching every `Cookie` header byte-wise so a non-UTF-8
/// value is still seen as present.
fn cookie_credential(headers: &HeaderMap, name: &str) -> Option<Credential> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .flat_map(|v| v.as_bytes().split(|b| *b == b';'))
        .find_map(|pair| {
            let pair = pair.trim_ascii();
            let eq = pair.iter().position(|b| *b == b'=')?;
            (&pair[..eq] == name.as_bytes()).then(|| match std::str::from_utf8(&pair[eq + 1..]) {
                Ok(v) => Credential::Value(v.trim().to_string()),
                Err(_) => Credential::Unreadable,
            })
        })
}
