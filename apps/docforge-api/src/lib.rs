//! Docforge API server
//!
//! Provides REST endpoints for:
//! - Document generation (DOCX or HTML plus preview)
//! - Standalone HTML preview pages
//! - Form field visibility and submission checks

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use config::Config;
pub use state::AppState;

/// Build the router with middleware
pub fn app(config: Config) -> Router {
    let body_limit = config.body_limit;
    let state = Arc::new(AppState::new(config));

    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/generate", post(handlers::generate))
        .route("/api/preview", post(handlers::preview))
        .route("/api/visibility", post(handlers::visibility))
        .route("/api/validate", post(handlers::validate))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
