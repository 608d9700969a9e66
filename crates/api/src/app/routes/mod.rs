use axum::{Router, routing::get};

pub mod hooks;
pub mod items;
pub mod session;
pub mod system;

/// Router for all authenticated (tenant-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/items", items::router())
}
