//! DTOs for the data sources and probe endpoints.

use serde::Serialize;

use crate::application::services::{ProbeOutcome, SourceInfo};
use crate::domain::entities::SourceId;

/// One registered source, with its key fingerprint when configured.
#[derive(Debug, Serialize)]
pub struct SourceEntry {
    #[serde(flatten)]
    pub info: SourceInfo,

    /// Stable HMAC fingerprint of the configured API key; lets operators
    /// confirm which credential is live without exposing it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_fingerprint: Option<String>,
}

/// Response envelope for `GET /api/v1/sources`.
#[derive(Debug, Serialize)]
pub struct SourcesResponse {
    pub success: bool,
    pub sources: Vec<SourceEntry>,
    pub primary_source: SourceId,
    pub total_sources: usize,
}

/// Credential configuration visibility for the probe endpoint.
#[derive(Debug, Serialize)]
pub struct EnvironmentInfo {
    pub use_mock_data: bool,
    pub foursquare_configured: bool,
    pub yelp_configured: bool,
    pub google_places_configured: bool,
}

/// Response envelope for `GET /api/v1/sources/test`.
#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub success: bool,
    pub available_sources: Vec<SourceId>,
    pub primary_source: SourceId,
    pub test_results: Vec<ProbeOutcome>,
    pub environment: EnvironmentInfo,
}
