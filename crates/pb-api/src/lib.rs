//! # pb-api
//!
//! The web routing and orchestration layer for the pastebin.

pub mod error;
pub mod handlers;
pub mod middleware;

pub use handlers::AppState;
pub use middleware::HttpSettings;

use axum::routing::{get, post};
use axum::Router;

/// Bare routes without middleware.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/healthz", get(handlers::health))
        .route("/api/pastes", post(handlers::create_paste))
        .route("/api/pastes/{id}", get(handlers::get_paste))
        .route("/p/{id}", get(handlers::view_paste))
        .fallback(handlers::not_found)
        .with_state(state)
}

/// Routes wrapped in the standard middleware stack.
pub fn router(state: AppState, settings: &HttpSettings) -> Router {
    middleware::apply_standard_layers(routes(state), settings)
}
