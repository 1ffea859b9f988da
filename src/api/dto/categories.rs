//! DTOs for the categories endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Category, SourceId};

fn default_source() -> String {
    "auto".to_string()
}

/// Query parameters for `GET /api/v1/categories`.
#[derive(Debug, Deserialize)]
pub struct CategoriesParams {
    #[serde(default = "default_source")]
    pub source: String,
}

/// Response envelope for category listings.
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub success: bool,
    pub source: SourceId,
    pub count: usize,
    pub categories: Vec<Category>,
}
