#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;

use insighthub::application::budget::BudgetTracker;
use insighthub::application::services::{CollectorService, CompetitorService};
use insighthub::domain::entities::SourceId;
use insighthub::domain::sources::PlaceSource;
use insighthub::infrastructure::cache::NullCache;
use insighthub::infrastructure::sources::MockSource;
use insighthub::state::AppState;

/// Builds an AppState backed by the mock source only.
///
/// Returns the TempDir holding the budget ledger so it outlives the test.
pub fn create_test_state() -> (AppState, TempDir) {
    create_test_state_with(vec![Arc::new(MockSource::new())])
}

pub fn create_test_state_with(sources: Vec<Arc<dyn PlaceSource>>) -> (AppState, TempDir) {
    let dir = TempDir::new().unwrap();

    let budget = Arc::new(BudgetTracker::load(
        dir.path().join("budget.json"),
        50,
        5.0,
        false,
    ));

    let collector = Arc::new(CollectorService::new(sources, Arc::new(NullCache::new())));
    let competitors = Arc::new(CompetitorService::new(collector.clone()));

    let state = AppState {
        collector,
        competitors,
        budget,
        cache: Arc::new(NullCache::new()),
        default_location: "New York".to_string(),
        use_mock_data: false,
        key_fingerprints: BTreeMap::from([(SourceId::Foursquare, "abcd1234abcd1234".to_string())]),
    };

    (state, dir)
}
