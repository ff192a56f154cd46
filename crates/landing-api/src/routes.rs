//! # Routes
//!
//! Axum router configuration for the landing page API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /health - Health check
/// - GET  /api/v1/offering - Price card
/// - POST /api/v1/checkout - Widget session descriptor
/// - POST /api/v1/checkout/outcome - Widget callback relay
/// - GET  /contact/whatsapp - WhatsApp redirect
pub fn create_router(state: AppState) -> Router {
    // The landing page may be served from a different origin (static hosting)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/offering", get(handlers::get_offering))
        .route("/checkout", post(handlers::create_checkout))
        .route("/checkout/outcome", post(handlers::checkout_outcome));

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // API v1
        .nest("/api/v1", api_routes)
        // Contact
        .route("/contact/whatsapp", get(handlers::whatsapp_contact))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        // State
        .with_state(state)
}
