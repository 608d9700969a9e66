//! HTTP API: server wiring, routing, auth middleware and request/response mapping.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
