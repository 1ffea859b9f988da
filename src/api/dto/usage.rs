//! DTOs for the usage/budget endpoint.

use serde::Serialize;

use crate::application::budget::UsageSummary;

/// Response envelope for `GET /api/v1/usage`.
#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub success: bool,
    pub usage: UsageSummary,
}
