use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use itemvault_auth::{AuthError, GateError, GateErrorKind, ProviderError};
use itemvault_store::StoreError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn auth_error_to_response(err: &AuthError) -> axum::response::Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::UNAUTHORIZED);
    json_error(status, err.code(), err.to_string())
}

/// Provider failures while minting a session. Details stay in the logs.
pub fn provider_error_to_response(err: &ProviderError) -> axum::response::Response {
    match err {
        ProviderError::Invalid(_) | ProviderError::Expired => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "invalid or expired token",
        ),
        ProviderError::Backend(_) => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "auth_unavailable",
            "authentication backend unavailable",
        ),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::InvalidPath(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_path", msg),
        StoreError::Backend(msg) => {
            tracing::error!(error = %msg, "document store failure");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                "document store unavailable",
            )
        }
    }
}

/// Body in the identity provider's error envelope:
/// `{"error": {"status": "PERMISSION_DENIED", "code": "...", "message": "..."}}`.
pub fn provider_envelope(
    status: StatusCode,
    status_name: &'static str,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": {
                "status": status_name,
                "code": code,
                "message": message.into(),
            }
        })),
    )
        .into_response()
}

pub fn gate_error_to_response(err: &GateError) -> axum::response::Response {
    let kind = err.kind();
    let status = StatusCode::from_u16(kind.http_status()).unwrap_or(StatusCode::FORBIDDEN);
    provider_envelope(status, kind.status(), kind.as_str(), err.to_string())
}

/// Hook payload that is not a JSON event at all.
pub fn hook_payload_rejection(rejection: &JsonRejection) -> axum::response::Response {
    tracing::warn!(error = %rejection.body_text(), "blocking hook payload rejected");
    let kind = GateErrorKind::InvalidArgument;
    provider_envelope(
        StatusCode::BAD_REQUEST,
        kind.status(),
        kind.as_str(),
        "Malformed event payload.",
    )
}

/// Hook invocation without a valid provider signature.
pub fn hook_unauthenticated() -> axum::response::Response {
    provider_envelope(
        StatusCode::UNAUTHORIZED,
        "UNAUTHENTICATED",
        "unauthenticated",
        "Hook invocation is not signed by the identity provider.",
    )
}

pub fn hook_auth_error_to_response(err: &ProviderError) -> axum::response::Response {
    match err {
        ProviderError::Backend(_) => provider_envelope(
            StatusCode::SERVICE_UNAVAILABLE,
            "UNAVAILABLE",
            "unavailable",
            "Identity provider unavailable.",
        ),
        ProviderError::Invalid(_) | ProviderError::Expired => hook_unauthenticated(),
    }
}
