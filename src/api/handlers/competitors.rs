//! Handler for the competitor analysis endpoint.

use axum::{Json, extract::Query, extract::State};
use serde_json::json;
use validator::Validate;

use crate::api::dto::competitors::{CompetitorsParams, CompetitorsResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns competitor analysis for a business.
///
/// # Endpoint
///
/// `GET /api/v1/competitors?business=Joe's+Pizza&location=New+York`
///
/// # Errors
///
/// Returns 400 when `business` is missing or empty.
pub async fn competitors_handler(
    State(state): State<AppState>,
    Query(params): Query<CompetitorsParams>,
) -> Result<Json<CompetitorsResponse>, AppError> {
    params.validate()?;

    let business = params
        .business
        .filter(|b| !b.is_empty())
        .ok_or_else(|| {
            AppError::bad_request("Business name is required", json!({ "parameter": "business" }))
        })?;

    let location = params
        .location
        .unwrap_or_else(|| state.default_location.clone());
    let limit = params.limit.unwrap_or(5).clamp(1, 25);

    let analysis = state
        .competitors
        .analyze(&business, &location, params.category, limit)
        .await?;

    Ok(Json(analysis.into()))
}
