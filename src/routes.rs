//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET /health`   - Health check: cache, budget ledger, sources (public)
//! - `/api/v1/*`     - Ingestion REST API
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Access log** - One line per request with sanitized query strings
//! - **Rate limiting** - Per-IP token bucket (proxy-aware when configured)
//! - **Security headers** - nosniff / frame deny / XSS protection
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{access_log, rate_limit, security_headers, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket
///   address; enable only behind a trusted reverse proxy
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    let api_router = if behind_proxy {
        api::routes::v1_routes().layer(rate_limit::proxy_layer())
    } else {
        api::routes::v1_routes().layer(rate_limit::layer())
    };

    let router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api/v1", api_router)
        .with_state(state)
        .layer(middleware::from_fn(security_headers::layer))
        .layer(middleware::from_fn(access_log::layer))
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
