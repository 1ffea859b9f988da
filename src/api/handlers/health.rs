//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Cache**: Redis PING (NullCache always reports healthy)
/// 2. **Budget ledger**: ledger file is writable
/// 3. **Sources**: at least one data source is registered
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let cache_check = check_cache(&state).await;
    let ledger_check = check_ledger(&state);
    let sources_check = check_sources(&state);

    let all_healthy = cache_check.status == "ok"
        && ledger_check.status == "ok"
        && sources_check.status == "ok";

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            cache: cache_check,
            budget_ledger: ledger_check,
            sources: sources_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Checks cache connectivity via PING command.
async fn check_cache(state: &AppState) -> CheckStatus {
    if state.cache.health_check().await {
        CheckStatus {
            status: "ok".to_string(),
            message: Some("Cache reachable".to_string()),
        }
    } else {
        CheckStatus {
            status: "error".to_string(),
            message: Some("Cache connection failed".to_string()),
        }
    }
}

/// Checks that the budget ledger can be persisted.
fn check_ledger(state: &AppState) -> CheckStatus {
    if state.budget.is_persistable() {
        CheckStatus {
            status: "ok".to_string(),
            message: None,
        }
    } else {
        CheckStatus {
            status: "error".to_string(),
            message: Some("Budget ledger is not writable".to_string()),
        }
    }
}

/// Checks that at least one data source is registered.
fn check_sources(state: &AppState) -> CheckStatus {
    if state.collector.has_sources() {
        CheckStatus {
            status: "ok".to_string(),
            message: Some(format!(
                "Primary source: {}",
                state.collector.primary()
            )),
        }
    } else {
        CheckStatus {
            status: "error".to_string(),
            message: Some("No data sources registered".to_string()),
        }
    }
}
