//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: external clients (store, identity provider, allowlist)
//! - `routes/`: HTTP handlers, one file per area
//! - `dto.rs`: request bodies and payload checks
//! - `errors.rs`: consistent error responses

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, SessionSettings, build_services};

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: AppServices) -> Router {
    let auth_state = middleware::AuthState {
        resolver: services.resolver.clone(),
    };

    // Tenant-scoped routes: every request must resolve to a uid first.
    let protected = routes::router()
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    // Blocking hooks: only the identity provider may call them.
    let hooks = routes::hooks::router().layer(axum::middleware::from_fn_with_state(
        middleware::HookAuthState {
            provider: services.provider.clone(),
        },
        middleware::hook_auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/auth", routes::session::router())
        .nest("/hooks", hooks)
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::log_requests))
                .layer(Extension(services)),
        )
}
