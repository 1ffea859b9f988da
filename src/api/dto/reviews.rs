//! DTOs for the business reviews endpoint.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::domain::entities::{Review, SourceId};

fn default_source() -> String {
    "auto".to_string()
}

/// Query parameters for `GET /api/v1/businesses/{id}/reviews`.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct ReviewsParams {
    #[serde(default = "default_source")]
    pub source: String,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Response envelope for business reviews.
#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub success: bool,
    pub business_id: String,
    pub source: SourceId,
    pub count: usize,
    pub reviews: Vec<Review>,
}
