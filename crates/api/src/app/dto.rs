use axum::http::StatusCode;
use serde::Deserialize;

use itemvault_store::Document;

use crate::app::errors;

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    /// ID token obtained from the identity provider's sign-in flow.
    pub token: String,
}

/// Item bodies must be JSON objects.
pub fn item_payload(body: serde_json::Value) -> Result<Document, axum::response::Response> {
    match body {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "item body must be a JSON object",
        )),
    }
}
