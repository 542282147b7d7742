//! # Routes
//!
//! Axum router configuration for the bookstore.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /, /index.html          - Storefront book table
/// - POST /create-checkout-session - Client secret for the posted `isbn`
/// - GET  /session-status          - Status of a session (return page)
/// - GET  /config                  - Publishable key for Stripe.js
/// - GET  /health                  - Health check
/// - everything else               - Static files (checkout.html, return.html, wasm bundle)
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        // Storefront
        .route("/", get(handlers::storefront))
        .route("/index.html", get(handlers::storefront))
        // Embedded checkout
        .route("/create-checkout-session", post(handlers::create_checkout_session))
        .route("/session-status", get(handlers::session_status))
        .route("/config", get(handlers::client_config))
        // Health check
        .route("/health", get(handlers::health))
        .fallback_service(static_files)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
