//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /        - Home page
//! GET  /health  - Health check (mounted in `crate::app`)
//! ```
//!
//! Anything else is a 404.

pub mod home;

use axum::{Router, http::Uri, routing::get};

use crate::error::AppError;
use crate::state::AppState;

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        .fallback(not_found)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
