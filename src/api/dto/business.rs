//! DTOs for the business details endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{BusinessDetails, SourceId};

fn default_source() -> String {
    "auto".to_string()
}

/// Query parameters for `GET /api/v1/businesses/{id}`.
#[derive(Debug, Deserialize)]
pub struct DetailsParams {
    #[serde(default = "default_source")]
    pub source: String,
}

/// Response envelope for a business details lookup.
#[derive(Debug, Serialize)]
pub struct DetailsResponse {
    pub success: bool,
    pub business_id: String,
    pub source: SourceId,
    pub details: BusinessDetails,
}
