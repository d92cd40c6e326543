use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::auth::require_admin;
use crate::core::ServerState;

/// Build a router with all routes registered (no global middleware, no state)
///
/// Admin routes sit behind the capability check; storefront and health
/// routes are public.
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    let admin = Router::new()
        // Rule administration
        .merge(api::bundle_rules::router())
        // Catalog writes
        .merge(api::catalog::admin_router())
        // Nonce issuing
        .merge(api::admin::router())
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        // Health API - public route
        .merge(api::health::router())
        // Catalog reads - public (rule editor pickers, storefront)
        .merge(api::catalog::router())
        // Storefront cart
        .merge(api::cart::router())
        .merge(admin)
}

/// Build a fully configured application with all middleware and state
pub fn build_app(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    build_router(&state)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TimeoutLayer::with_status_code(
            http::StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(CorsLayer::permissive())
        // Trace - outermost, logs every request at INFO
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
