use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use itemvault_core::ItemId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::TenantContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
}

fn parse_id(id: String) -> Result<ItemId, axum::response::Response> {
    id.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id"))
}

pub async fn create_item(
    Extension(services): Extension<AppServices>,
    Extension(tenant): Extension<TenantContext>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let payload = match dto::item_payload(body) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match services.items.create(tenant.uid(), payload).await {
        Ok(item) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "id": item.id.as_str(),
                "message": "Item created",
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_items(
    Extension(services): Extension<AppServices>,
    Extension(tenant): Extension<TenantContext>,
) -> axum::response::Response {
    match services.items.list(tenant.uid()).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<AppServices>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.items.get(tenant.uid(), &id).await {
        Ok(Some(item)) => (StatusCode::OK, Json(item)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "item not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<AppServices>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let id = match parse_id(id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let fields = match dto::item_payload(body) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match services.items.update(tenant.uid(), &id, fields).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<AppServices>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.items.delete(tenant.uid(), &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
