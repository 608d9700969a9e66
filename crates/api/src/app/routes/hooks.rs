//! Blocking hooks called by the identity provider before it commits an
//! account creation or a sign-in.
//!
//! Allow is `200 {}`; the provider then proceeds unmodified. Every failure,
//! including an unparseable payload, answers in the provider's error envelope.

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    response::IntoResponse,
    routing::post,
};

use itemvault_auth::{EventType, LifecycleEvent};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/before-create", post(before_create))
        .route("/before-sign-in", post(before_sign_in))
}

fn gate(
    services: &AppServices,
    hook: EventType,
    payload: Result<Json<LifecycleEvent>, JsonRejection>,
) -> axum::response::Response {
    let event = match payload {
        Ok(Json(event)) => event,
        Err(rejection) => return errors::hook_payload_rejection(&rejection),
    };
    tracing::info!(hook = %hook, event_type = ?event.event_type, event_id = ?event.event_id, "blocking hook invoked");

    match services.gate.check(&event) {
        Ok(()) => {
            tracing::info!(hook = %hook, "blocking hook allowed");
            Json(serde_json::json!({})).into_response()
        }
        Err(e) => errors::gate_error_to_response(&e),
    }
}

pub async fn before_create(
    Extension(services): Extension<AppServices>,
    payload: Result<Json<LifecycleEvent>, JsonRejection>,
) -> axum::response::Response {
    gate(&services, EventType::BeforeCreate, payload)
}

pub async fn before_sign_in(
    Extension(services): Extension<AppServices>,
    payload: Result<Json<LifecycleEvent>, JsonRejection>,
) -> axum::response::Response {
    gate(&services, EventType::BeforeSignIn, payload)
}
