//! Shared application state injected into all handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::budget::BudgetTracker;
use crate::application::services::{CollectorService, CompetitorService};
use crate::domain::entities::SourceId;
use crate::infrastructure::cache::CacheService;

/// Application state shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub collector: Arc<CollectorService>,
    pub competitors: Arc<CompetitorService>,
    pub budget: Arc<BudgetTracker>,
    pub cache: Arc<dyn CacheService>,

    /// Search location used when a request omits `location`.
    pub default_location: String,
    pub use_mock_data: bool,

    /// HMAC fingerprints of configured provider keys, exposed by the
    /// sources endpoint for operator verification.
    pub key_fingerprints: BTreeMap<SourceId, String>,
}
