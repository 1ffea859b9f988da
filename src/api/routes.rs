//! API route configuration.

use crate::api::handlers::{
    business_details_handler, business_reviews_handler, categories_handler, competitors_handler,
    probe_handler, search_handler, sources_handler, usage_handler,
};
use crate::state::AppState;
use axum::{Router, routing::get};

/// All v1 API routes.
///
/// # Endpoints
///
/// - `GET /search`                      - Search businesses in a location
/// - `GET /businesses/{id}`             - Business details
/// - `GET /businesses/{id}/reviews`     - Business reviews/tips
/// - `GET /competitors`                 - Competitor analysis
/// - `GET /categories`                  - Source category listing
/// - `GET /sources`                     - Registered data sources
/// - `GET /sources/test`                - Live source connectivity probe
/// - `GET /usage`                       - Budget / usage summary
pub fn v1_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(search_handler))
        .route("/businesses/{id}", get(business_details_handler))
        .route("/businesses/{id}/reviews", get(business_reviews_handler))
        .route("/competitors", get(competitors_handler))
        .route("/categories", get(categories_handler))
        .route("/sources", get(sources_handler))
        .route("/sources/test", get(probe_handler))
        .route("/usage", get(usage_handler))
}
