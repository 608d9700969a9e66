use axum::{Json, extract::Extension, response::IntoResponse};

use crate::context::TenantContext;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "online" }))
}

pub async fn whoami(Extension(tenant): Extension<TenantContext>) -> impl IntoResponse {
    Json(serde_json::json!({ "uid": tenant.uid().as_str() }))
}
