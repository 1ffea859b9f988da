//! Handlers for the data sources and probe endpoints.

use axum::{Json, extract::State};

use crate::api::dto::sources::{EnvironmentInfo, ProbeResponse, SourceEntry, SourcesResponse};
use crate::domain::entities::SourceId;
use crate::error::AppError;
use crate::state::AppState;

/// Describes the registered data sources.
///
/// # Endpoint
///
/// `GET /api/v1/sources`
pub async fn sources_handler(
    State(state): State<AppState>,
) -> Result<Json<SourcesResponse>, AppError> {
    let sources: Vec<SourceEntry> = state
        .collector
        .source_info()
        .into_iter()
        .map(|info| SourceEntry {
            key_fingerprint: state.key_fingerprints.get(&info.name).cloned(),
            info,
        })
        .collect();

    Ok(Json(SourcesResponse {
        success: true,
        primary_source: state.collector.primary(),
        total_sources: sources.len(),
        sources,
    }))
}

/// Probes every registered source with a minimal live search.
///
/// # Endpoint
///
/// `GET /api/v1/sources/test`
///
/// Per-source failures are reported in `test_results` rather than failing
/// the request. Note that probing real sources consumes budget.
pub async fn probe_handler(State(state): State<AppState>) -> Result<Json<ProbeResponse>, AppError> {
    let test_results = state.collector.probe_all().await;

    Ok(Json(ProbeResponse {
        success: true,
        available_sources: state.collector.available_sources(),
        primary_source: state.collector.primary(),
        test_results,
        environment: EnvironmentInfo {
            use_mock_data: state.use_mock_data,
            foursquare_configured: state.key_fingerprints.contains_key(&SourceId::Foursquare),
            yelp_configured: state.key_fingerprints.contains_key(&SourceId::Yelp),
            google_places_configured: state
                .key_fingerprints
                .contains_key(&SourceId::GooglePlaces),
        },
    }))
}
