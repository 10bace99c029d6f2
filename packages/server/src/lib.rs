//! HTTP surface of the Mid-Vision advisory service.
//!
//! Exposes the public diagnostic intake and provider directory endpoints,
//! session-backed admin authentication, and the OpenRouter key-management
//! panel. Domain logic lives in the `midvision-advisory` crate; this crate
//! only wires it to axum.

use axum::middleware as axum_middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use config::AppConfig;
pub use state::AppState;

/// Build the application router. The session layer is applied by the caller
/// so tests can supply their own store.
pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/key/status", get(handlers::key_status))
        .route("/key/test", post(handlers::key_test))
        .route("/key", delete(handlers::key_delete))
        .route("/models", get(handlers::list_models))
        .route("/chat", post(handlers::chat))
        .route("/diagnostics", get(handlers::list_diagnostics))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let openrouter_routes = Router::new()
        .route("/login", get(auth::openrouter_login))
        .route("/callback", get(auth::openrouter_callback))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/diagnostic", post(handlers::submit_diagnostic))
        .route("/api/providers", get(handlers::list_providers))
        .route("/api/providers/facets", get(handlers::provider_facets))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/status", get(auth::status))
        .nest("/api/admin", admin_routes)
        .nest("/auth/openrouter", openrouter_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
