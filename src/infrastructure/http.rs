//! Shared upstream HTTP plumbing: client construction, transient-failure
//! retry, and error mapping.

use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::warn;

use crate::domain::entities::SourceId;
use crate::error::AppError;

/// Retry attempts for transient upstream failures (initial call + 2 retries).
const RETRY_ATTEMPTS: usize = 2;

/// Errors raised while talking to an upstream provider.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("provider rate limit reached")]
    RateLimited,

    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl SourceError {
    /// Transient failures are retried; everything else surfaces immediately.
    fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status >= 500,
            Self::RateLimited | Self::Decode(_) => false,
        }
    }

    /// Maps the failure into the application error taxonomy.
    ///
    /// Provider 429s become [`AppError::BudgetExceeded`] so clients see the
    /// same error shape as an internal budget refusal.
    pub fn into_app_error(self, provider: SourceId) -> AppError {
        match self {
            Self::RateLimited => AppError::budget_exceeded(
                format!("{} API rate limit reached", provider),
                json!({ "provider": provider.as_str() }),
            ),
            Self::Status { status, body } => AppError::upstream(
                format!("{} API error", provider),
                json!({ "provider": provider.as_str(), "status": status, "body": truncate(&body) }),
            ),
            Self::Transport(e) => AppError::upstream(
                format!("{} API error", provider),
                json!({ "provider": provider.as_str(), "reason": e.to_string() }),
            ),
            Self::Decode(reason) => AppError::upstream(
                format!("{} returned an unexpected response", provider),
                json!({ "provider": provider.as_str(), "reason": reason }),
            ),
        }
    }
}

/// Keeps error bodies loggable without echoing whole payloads.
fn truncate(body: &str) -> String {
    const MAX: usize = 256;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    }
}

/// Builds the shared reqwest client used by all provider clients.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("insighthub/", env!("CARGO_PKG_VERSION")))
        .build()?;

    Ok(client)
}

/// Sends a GET request and decodes the JSON body, retrying transient
/// failures with exponential backoff (1s, 2s).
///
/// `build` is called once per attempt to produce a fresh request.
///
/// # Errors
///
/// - [`SourceError::RateLimited`] on HTTP 429 (never retried)
/// - [`SourceError::Status`] on other non-success statuses
/// - [`SourceError::Transport`] / [`SourceError::Decode`] on I/O and body failures
pub async fn fetch_json<F>(provider: SourceId, build: F) -> Result<Value, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(500)
        .take(RETRY_ATTEMPTS);

    RetryIf::spawn(
        strategy,
        || async {
            let response = build().send().await?;
            let status = response.status();

            if status.as_u16() == 429 {
                warn!("{} rate limit reached (HTTP 429)", provider);
                return Err(SourceError::RateLimited);
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(SourceError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            response.json::<Value>().await.map_err(SourceError::from)
        },
        |e: &SourceError| {
            let transient = e.is_transient();
            if transient {
                warn!("{} transient upstream failure, retrying: {}", provider, e);
            }
            transient
        },
    )
    .await
}
