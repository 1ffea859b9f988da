//! Handler for the categories endpoint.

use axum::{Json, extract::Query, extract::State};

use crate::api::dto::categories::{CategoriesParams, CategoriesResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns the categories a source can filter by.
///
/// # Endpoint
///
/// `GET /api/v1/categories?source=auto`
pub async fn categories_handler(
    State(state): State<AppState>,
    Query(params): Query<CategoriesParams>,
) -> Result<Json<CategoriesResponse>, AppError> {
    let (source, categories) = state.collector.categories(&params.source).await?;

    Ok(Json(CategoriesResponse {
        success: true,
        source,
        count: categories.len(),
        categories,
    }))
}
