//! Session cookie exchange: ID token in, `session` cookie out.

use axum::{
    Json, Router,
    extract::Extension,
    http::header,
    response::IntoResponse,
    routing::post,
};

use crate::app::services::{AppServices, SessionSettings};
use crate::app::{dto, errors};
use crate::middleware::SESSION_COOKIE;

pub fn router() -> Router {
    Router::new()
        .route("/session", post(create_session))
        .route("/logout", post(logout))
}

fn session_cookie(value: &str, settings: &SessionSettings) -> String {
    let secure = if settings.secure { "; Secure" } else { "" };
    format!(
        "{SESSION_COOKIE}={value}; Max-Age={}; HttpOnly{secure}; SameSite=Lax; Path=/",
        settings.ttl.num_seconds()
    )
}

fn cleared_cookie(settings: &SessionSettings) -> String {
    let secure = if settings.secure { "; Secure" } else { "" };
    format!(
        "{SESSION_COOKIE}=; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly{secure}; SameSite=Lax; Path=/"
    )
}

pub async fn create_session(
    Extension(services): Extension<AppServices>,
    Json(body): Json<dto::SessionRequest>,
) -> axum::response::Response {
    let cookie = match services
        .provider
        .create_session_cookie(body.token.trim(), services.session.ttl)
        .await
    {
        Ok(cookie) => cookie,
        Err(e) => {
            tracing::warn!(error = %e, "session exchange rejected");
            return errors::provider_error_to_response(&e);
        }
    };

    tracing::info!("session cookie issued");
    (
        [(header::SET_COOKIE, session_cookie(&cookie, &services.session))],
        Json(serde_json::json!({ "status": "success" })),
    )
        .into_response()
}

pub async fn logout(Extension(services): Extension<AppServices>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, cleared_cookie(&services.session))],
        Json(serde_json::json!({ "status": "success" })),
    )
}
