//! Data collection service: source selection, caching, and mock fallback.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::domain::entities::{Business, BusinessDetails, Category, Review, SourceId};
use crate::domain::sources::{PlaceSource, SearchQuery};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use serde_json::json;

/// Cache TTLs per operation, in seconds.
const SEARCH_TTL: usize = 300;
const DETAILS_TTL: usize = 3_600;
const REVIEWS_TTL: usize = 1_800;
const CATEGORIES_TTL: usize = 86_400;

/// Result of a search, with provenance for the response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub source: SourceId,
    pub businesses: Vec<Business>,
    /// True when served from cache rather than the provider.
    #[serde(default)]
    pub cached: bool,
    /// True when the requested source failed and mock data answered instead.
    #[serde(default)]
    pub fell_back: bool,
}

/// Result of a details lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailsOutcome {
    pub source: SourceId,
    pub details: BusinessDetails,
    #[serde(default)]
    pub cached: bool,
}

/// Result of a reviews lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewsOutcome {
    pub source: SourceId,
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub cached: bool,
}

/// Static description of a registered source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub name: SourceId,
    pub available: bool,
    pub kind: &'static str,
    pub description: &'static str,
}

/// Outcome of probing one source.
#[derive(Debug, Serialize)]
pub struct ProbeOutcome {
    pub source: SourceId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<crate::error::ErrorInfo>,
}

/// Orchestrates data sources behind a read-through cache.
///
/// Selection rules:
/// - `auto` resolves to the primary source (Foursquare when registered,
///   mock otherwise); `mock_`-prefixed business ids always resolve to mock
/// - a named source must be registered, otherwise the request is rejected
///   listing what is available
///
/// Upstream failures during search degrade to mock data instead of failing
/// the request.
pub struct CollectorService {
    registry: BTreeMap<SourceId, Arc<dyn PlaceSource>>,
    cache: Arc<dyn CacheService>,
}

impl CollectorService {
    /// Creates a collector over the given sources.
    pub fn new(sources: Vec<Arc<dyn PlaceSource>>, cache: Arc<dyn CacheService>) -> Self {
        let mut registry = BTreeMap::new();
        for source in sources {
            info!("Source registered: {}", source.id());
            registry.insert(source.id(), source);
        }

        Self { registry, cache }
    }

    /// Registered sources, in priority order.
    pub fn available_sources(&self) -> Vec<SourceId> {
        SourceId::ALL
            .into_iter()
            .filter(|id| self.registry.contains_key(id))
            .collect()
    }

    /// The source `auto` resolves to: Foursquare when registered, else mock.
    pub fn primary(&self) -> SourceId {
        if self.registry.contains_key(&SourceId::Foursquare) {
            SourceId::Foursquare
        } else {
            SourceId::Mock
        }
    }

    /// Resolves a source selector from the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for unknown names and
    /// [`AppError::Unavailable`] for known sources that are not registered.
    pub fn resolve(&self, selector: &str, business_id: Option<&str>) -> Result<SourceId, AppError> {
        if selector == "auto" || selector.is_empty() {
            if business_id.is_some_and(|id| id.starts_with("mock_")) {
                return Ok(SourceId::Mock);
            }
            return Ok(self.primary());
        }

        let id: SourceId = selector.parse().map_err(|_| {
            AppError::bad_request(
                format!("Unknown source '{}'", selector),
                json!({ "available": self.available_sources() }),
            )
        })?;

        if !self.registry.contains_key(&id) {
            return Err(AppError::unavailable(
                format!("Source '{}' is not configured", id),
                json!({ "available": self.available_sources() }),
            ));
        }

        Ok(id)
    }

    fn source(&self, id: SourceId) -> Result<&Arc<dyn PlaceSource>, AppError> {
        self.registry.get(&id).ok_or_else(|| {
            AppError::unavailable(
                format!("Source '{}' is not configured", id),
                json!({ "available": self.available_sources() }),
            )
        })
    }

    /// Reads a cached JSON document, tolerating stale or corrupt payloads.
    async fn cache_get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    metrics::counter!("collector_cache_hits_total").increment(1);
                    Some(value)
                }
                Err(e) => {
                    warn!("Discarding undecodable cache entry {}: {}", key, e);
                    let _ = self.cache.invalidate(key).await;
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                error!("Cache error for {}: {}", key, e);
                None
            }
        }
    }

    /// Stores a JSON document in cache, fire-and-forget.
    async fn cache_put<T: Serialize>(&self, key: &str, value: &T, ttl: usize) {
        match serde_json::to_string(value) {
            Ok(raw) => {
                if let Err(e) = self.cache.set(key, &raw, Some(ttl)).await {
                    error!("Failed to cache {}: {}", key, e);
                }
            }
            Err(e) => error!("Failed to serialize cache entry {}: {}", key, e),
        }
    }

    /// Searches through the selected source, consulting the cache first and
    /// degrading to mock data when a real source fails.
    ///
    /// # Errors
    ///
    /// Returns an error only when the resolved source is invalid or the
    /// mock fallback itself fails.
    pub async fn search(
        &self,
        selector: &str,
        query: &SearchQuery,
    ) -> Result<SearchOutcome, AppError> {
        let source_id = self.resolve(selector, None)?;
        metrics::counter!("collector_searches_total").increment(1);

        match self.search_on(source_id, query).await {
            Ok(outcome) => Ok(outcome),
            Err(e) if source_id != SourceId::Mock && self.registry.contains_key(&SourceId::Mock) => {
                warn!("Search via {} failed ({}), falling back to mock", source_id, e);
                metrics::counter!("collector_fallbacks_total").increment(1);

                let mut outcome = self.search_on(SourceId::Mock, query).await?;
                outcome.fell_back = true;
                Ok(outcome)
            }
            Err(e) => Err(e),
        }
    }

    async fn search_on(
        &self,
        source_id: SourceId,
        query: &SearchQuery,
    ) -> Result<SearchOutcome, AppError> {
        let key = format!(
            "search:{}:{}:{}:{}:{}",
            source_id,
            query.location,
            query.query.as_deref().unwrap_or(""),
            query.category.as_deref().unwrap_or(""),
            query.limit
        );

        if let Some(mut cached) = self.cache_get::<SearchOutcome>(&key).await {
            debug!("Cache hit for {}", key);
            cached.cached = true;
            cached.fell_back = false;
            return Ok(cached);
        }

        let source = self.source(source_id)?;
        let businesses = source.search(query).await.inspect_err(|_| {
            metrics::counter!("collector_upstream_errors_total").increment(1);
        })?;

        let outcome = SearchOutcome {
            source: source_id,
            businesses,
            cached: false,
            fell_back: false,
        };

        self.cache_put(&key, &outcome, SEARCH_TTL).await;

        debug!(
            "Collected {} businesses from {}",
            outcome.businesses.len(),
            source_id
        );
        Ok(outcome)
    }

    /// Fetches business details through the selected source.
    ///
    /// # Errors
    ///
    /// Propagates resolution and upstream errors; a missing business is
    /// `Ok(None)`.
    pub async fn details(
        &self,
        business_id: &str,
        selector: &str,
    ) -> Result<Option<DetailsOutcome>, AppError> {
        let source_id = self.resolve(selector, Some(business_id))?;
        let key = format!("details:{}:{}", source_id, business_id);

        if let Some(mut cached) = self.cache_get::<DetailsOutcome>(&key).await {
            cached.cached = true;
            return Ok(Some(cached));
        }

        let source = self.source(source_id)?;
        let Some(details) = source.details(business_id).await.inspect_err(|_| {
            metrics::counter!("collector_upstream_errors_total").increment(1);
        })?
        else {
            return Ok(None);
        };

        let outcome = DetailsOutcome {
            source: source_id,
            details,
            cached: false,
        };

        self.cache_put(&key, &outcome, DETAILS_TTL).await;
        Ok(Some(outcome))
    }

    /// Fetches reviews through the selected source.
    ///
    /// # Errors
    ///
    /// Propagates resolution and upstream errors.
    pub async fn reviews(
        &self,
        business_id: &str,
        selector: &str,
        limit: usize,
    ) -> Result<ReviewsOutcome, AppError> {
        let source_id = self.resolve(selector, Some(business_id))?;
        let key = format!("reviews:{}:{}:{}", source_id, business_id, limit);

        if let Some(mut cached) = self.cache_get::<ReviewsOutcome>(&key).await {
            cached.cached = true;
            return Ok(cached);
        }

        let source = self.source(source_id)?;
        let reviews = source.reviews(business_id, limit).await.inspect_err(|_| {
            metrics::counter!("collector_upstream_errors_total").increment(1);
        })?;

        let outcome = ReviewsOutcome {
            source: source_id,
            reviews,
            cached: false,
        };

        self.cache_put(&key, &outcome, REVIEWS_TTL).await;
        Ok(outcome)
    }

    /// Lists categories from the selected source.
    ///
    /// # Errors
    ///
    /// Propagates resolution and upstream errors.
    pub async fn categories(&self, selector: &str) -> Result<(SourceId, Vec<Category>), AppError> {
        let source_id = self.resolve(selector, None)?;
        let key = format!("categories:{}", source_id);

        if let Some(cached) = self.cache_get::<Vec<Category>>(&key).await {
            return Ok((source_id, cached));
        }

        let source = self.source(source_id)?;
        let categories = source.categories().await?;

        self.cache_put(&key, &categories, CATEGORIES_TTL).await;
        Ok((source_id, categories))
    }

    /// Describes all registered sources.
    pub fn source_info(&self) -> Vec<SourceInfo> {
        self.available_sources()
            .into_iter()
            .map(|id| SourceInfo {
                name: id,
                available: true,
                kind: if id.is_real() { "real_api" } else { "mock_data" },
                description: match id {
                    SourceId::Foursquare => "Foursquare Places API (50K free requests/month)",
                    SourceId::Yelp => "Yelp Fusion API (free tier)",
                    SourceId::GooglePlaces => "Google Places API (metered)",
                    SourceId::Mock => "Generated mock data for development",
                },
            })
            .collect()
    }

    /// Probes every registered source with a minimal search.
    ///
    /// Failures are captured per source, never propagated.
    pub async fn probe_all(&self) -> Vec<ProbeOutcome> {
        let mut outcomes = Vec::new();

        for id in self.available_sources() {
            let outcome = match self.registry[&id].probe().await {
                Ok(count) => ProbeOutcome {
                    source: id,
                    status: "connected",
                    count: Some(count),
                    error: None,
                },
                Err(e) => ProbeOutcome {
                    source: id,
                    status: "error",
                    count: None,
                    error: Some(e.to_error_info()),
                },
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    /// True when at least one source is registered.
    pub fn has_sources(&self) -> bool {
        !self.registry.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sources::MockPlaceSource;
    use crate::infrastructure::cache::NullCache;
    use crate::infrastructure::sources::MockSource;

    fn failing_source(id: SourceId) -> Arc<dyn PlaceSource> {
        let mut mock = MockPlaceSource::new();
        mock.expect_id().return_const(id);
        mock.expect_search().returning(|_| {
            Err(AppError::upstream(
                "boom",
                serde_json::json!({}),
            ))
        });
        Arc::new(mock)
    }

    fn collector_with(sources: Vec<Arc<dyn PlaceSource>>) -> CollectorService {
        CollectorService::new(sources, Arc::new(NullCache::new()))
    }

    #[test]
    fn test_primary_prefers_foursquare() {
        let mut foursquare = MockPlaceSource::new();
        foursquare.expect_id().return_const(SourceId::Foursquare);

        let collector = collector_with(vec![Arc::new(MockSource::new()), Arc::new(foursquare)]);
        assert_eq!(collector.primary(), SourceId::Foursquare);
    }

    #[test]
    fn test_primary_falls_back_to_mock() {
        let collector = collector_with(vec![Arc::new(MockSource::new())]);
        assert_eq!(collector.primary(), SourceId::Mock);
    }

    #[test]
    fn test_resolve_auto_routes_mock_ids_to_mock() {
        let mut foursquare = MockPlaceSource::new();
        foursquare.expect_id().return_const(SourceId::Foursquare);

        let collector = collector_with(vec![Arc::new(MockSource::new()), Arc::new(foursquare)]);

        assert_eq!(
            collector.resolve("auto", Some("mock_7")).unwrap(),
            SourceId::Mock
        );
        assert_eq!(
            collector.resolve("auto", Some("4b5f0f")).unwrap(),
            SourceId::Foursquare
        );
    }

    #[test]
    fn test_resolve_unknown_name_is_validation_error() {
        let collector = collector_with(vec![Arc::new(MockSource::new())]);

        let err = collector.resolve("tripadvisor", None).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_resolve_unregistered_source_is_unavailable() {
        let collector = collector_with(vec![Arc::new(MockSource::new())]);

        let err = collector.resolve("yelp", None).unwrap_err();
        assert!(matches!(err, AppError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_search_falls_back_to_mock_on_upstream_failure() {
        let collector = collector_with(vec![
            Arc::new(MockSource::new()),
            failing_source(SourceId::Foursquare),
        ]);

        let query = SearchQuery::new("New York").with_limit(3);
        let outcome = collector.search("foursquare", &query).await.unwrap();

        assert!(outcome.fell_back);
        assert_eq!(outcome.source, SourceId::Mock);
        assert_eq!(outcome.businesses.len(), 3);
    }

    #[tokio::test]
    async fn test_search_mock_failure_does_not_recurse() {
        let mut mock = MockPlaceSource::new();
        mock.expect_id().return_const(SourceId::Mock);
        mock.expect_search()
            .returning(|_| Err(AppError::internal("broken", serde_json::json!({}))));

        let collector = collector_with(vec![Arc::new(mock)]);

        let query = SearchQuery::new("New York");
        let result = collector.search("mock", &query).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_details_via_auto_for_mock_id() {
        let collector = collector_with(vec![Arc::new(MockSource::new())]);

        let outcome = collector.details("mock_2", "auto").await.unwrap().unwrap();

        assert_eq!(outcome.source, SourceId::Mock);
        assert_eq!(outcome.details.summary.id, "mock_2");
        assert!(!outcome.cached);
    }

    #[tokio::test]
    async fn test_details_not_found() {
        let collector = collector_with(vec![Arc::new(MockSource::new())]);

        let outcome = collector.details("fsq_unknown", "mock").await.unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_reviews_respect_limit() {
        let collector = collector_with(vec![Arc::new(MockSource::new())]);

        let outcome = collector.reviews("mock_1", "auto", 7).await.unwrap();

        assert_eq!(outcome.reviews.len(), 7);
        assert_eq!(outcome.source, SourceId::Mock);
    }

    #[tokio::test]
    async fn test_probe_all_captures_failures() {
        let mut broken = MockPlaceSource::new();
        broken.expect_id().return_const(SourceId::Yelp);
        broken
            .expect_probe()
            .returning(|| Err(AppError::upstream("down", serde_json::json!({}))));

        let collector = collector_with(vec![Arc::new(MockSource::new()), Arc::new(broken)]);

        let outcomes = collector.probe_all().await;

        assert_eq!(outcomes.len(), 2);
        let yelp = outcomes.iter().find(|o| o.source == SourceId::Yelp).unwrap();
        assert_eq!(yelp.status, "error");
        assert!(yelp.error.is_some());

        let mock = outcomes.iter().find(|o| o.source == SourceId::Mock).unwrap();
        assert_eq!(mock.status, "connected");
        assert_eq!(mock.count, Some(2));
    }

    #[test]
    fn test_source_info_kinds() {
        let mut yelp = MockPlaceSource::new();
        yelp.expect_id().return_const(SourceId::Yelp);

        let collector = collector_with(vec![Arc::new(MockSource::new()), Arc::new(yelp)]);
        let info = collector.source_info();

        assert_eq!(info.len(), 2);
        assert!(info
            .iter()
            .any(|i| i.name == SourceId::Yelp && i.kind == "real_api"));
        assert!(info
            .iter()
            .any(|i| i.name == SourceId::Mock && i.kind == "mock_data"));
    }
}
