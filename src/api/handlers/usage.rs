//! Handler for the usage/budget endpoint.

use axum::{Json, extract::State};

use crate::api::dto::usage::UsageResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the current API usage and spend summary.
///
/// # Endpoint
///
/// `GET /api/v1/usage`
pub async fn usage_handler(State(state): State<AppState>) -> Result<Json<UsageResponse>, AppError> {
    Ok(Json(UsageResponse {
        success: true,
        usage: state.budget.summary(),
    }))
}
