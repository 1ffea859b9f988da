//! Handler for the business reviews endpoint.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::api::dto::reviews::{ReviewsParams, ReviewsResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns reviews (or tips) for a business.
///
/// # Endpoint
///
/// `GET /api/v1/businesses/{business_id}/reviews?source=auto&limit=20`
///
/// Sources without review access (Google Places free tier) return an
/// empty list rather than an error.
pub async fn business_reviews_handler(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    Query(params): Query<ReviewsParams>,
) -> Result<Json<ReviewsResponse>, AppError> {
    let limit = params.limit.unwrap_or(20).clamp(1, 50);

    let outcome = state
        .collector
        .reviews(&business_id, &params.source, limit)
        .await?;

    Ok(Json(ReviewsResponse {
        success: true,
        business_id,
        source: outcome.source,
        count: outcome.reviews.len(),
        reviews: outcome.reviews,
    }))
}
