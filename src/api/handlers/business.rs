//! Handler for the business details endpoint.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::json;

use crate::api::dto::business::{DetailsParams, DetailsResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns detailed information about a business.
///
/// # Endpoint
///
/// `GET /api/v1/businesses/{business_id}?source=auto`
///
/// # Source Resolution
///
/// With `source=auto`, ids prefixed `mock_` resolve to the mock source;
/// everything else goes to the primary source.
///
/// # Errors
///
/// Returns 404 when the business does not exist at the resolved source.
pub async fn business_details_handler(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    Query(params): Query<DetailsParams>,
) -> Result<Json<DetailsResponse>, AppError> {
    let outcome = state
        .collector
        .details(&business_id, &params.source)
        .await?
        .ok_or_else(|| {
            AppError::not_found(
                "Business not found",
                json!({ "business_id": business_id.clone(), "source": params.source }),
            )
        })?;

    Ok(Json(DetailsResponse {
        success: true,
        business_id,
        source: outcome.source,
        details: outcome.details,
    }))
}
