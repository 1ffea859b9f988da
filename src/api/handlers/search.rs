//! Handler for the business search endpoint.

use axum::{Json, extract::Query, extract::State};
use chrono::Utc;
use validator::Validate;

use crate::api::dto::search::{CacheInfo, SearchParams, SearchResponse};
use crate::domain::sources::SearchQuery;
use crate::error::AppError;
use crate::state::AppState;

/// Searches for businesses in a location.
///
/// # Endpoint
///
/// `GET /api/v1/search?location=New+York&source=foursquare&limit=10`
///
/// # Query Parameters
///
/// - `location` - place name or `lat,lng` (default: configured location)
/// - `source` - `auto` (default), `foursquare`, `yelp`, `google_places`, `mock`
/// - `query` - free-text term filter
/// - `category` - provider category filter
/// - `radius` - search radius in meters (clamped to provider caps)
/// - `limit` - max results, 1-50 (default: 10)
///
/// # Fallback
///
/// When the selected real source fails, results come from the mock source
/// and `source` in the response reflects that.
///
/// # Errors
///
/// Returns 400 for unknown source names, 503 for configured-but-missing
/// sources.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    params.validate()?;

    let location = params
        .location
        .unwrap_or_else(|| state.default_location.clone());

    let query = SearchQuery::new(&location)
        .with_query(params.query)
        .with_category(params.category)
        .with_radius(params.radius.unwrap_or(5_000))
        .with_limit(params.limit.unwrap_or(10));

    let outcome = state.collector.search(&params.source, &query).await?;

    Ok(Json(SearchResponse {
        success: true,
        source: outcome.source,
        location,
        query: query.query.unwrap_or_default(),
        category: query.category.unwrap_or_default(),
        count: outcome.businesses.len(),
        cache_info: CacheInfo::new(outcome.source, outcome.cached),
        businesses: outcome.businesses,
        timestamp: Utc::now().to_rfc3339(),
    }))
}
