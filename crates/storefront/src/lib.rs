//! Tensura Store storefront library.
//!
//! This crate provides the storefront and the backend-platform wrappers as a
//! library, allowing them to be tested and reused.
//!
//! - [`platform`] - identity, document store and blob store adapters
//! - [`telemetry`] - logging setup with Sentry forwarding
//! - [`routes`] - the HTTP surface

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod platform;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the storefront router with its middleware stack.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the platform.
async fn health() -> &'static str {
    "ok"
}
