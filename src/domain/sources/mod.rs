//! Data source contract implemented by every provider client.

use crate::domain::entities::{Business, BusinessDetails, Category, Review, SourceId};
use crate::error::AppError;
use async_trait::async_trait;

/// Maximum search radius accepted by any provider (Foursquare's cap).
pub const MAX_RADIUS_METERS: u32 = 100_000;

/// Maximum results per search request (Foursquare's per-page cap).
pub const MAX_SEARCH_LIMIT: usize = 50;

/// A normalized search request.
///
/// `location` is either a free-text place name (`"New York"`) or a
/// `"lat,lng"` pair; sources interpret it via [`crate::utils::location`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub location: String,
    pub query: Option<String>,
    pub category: Option<String>,
    pub radius_meters: u32,
    pub limit: usize,
}

impl SearchQuery {
    /// Creates a query with the default radius (5 km) and limit (20),
    /// clamping out-of-range values instead of rejecting them.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            query: None,
            category: None,
            radius_meters: 5_000,
            limit: 20,
        }
    }

    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category.filter(|c| !c.is_empty());
        self
    }

    pub fn with_radius(mut self, radius_meters: u32) -> Self {
        self.radius_meters = radius_meters.min(MAX_RADIUS_METERS);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(1, MAX_SEARCH_LIMIT);
        self
    }
}

/// Interface for business/place data sources.
///
/// Implementations must be thread-safe. Real providers enforce budget and
/// throttling before every upstream call; the mock source generates data
/// locally and never fails.
///
/// # Implementations
///
/// - [`crate::infrastructure::sources::FoursquareSource`] - Foursquare Places v3
/// - [`crate::infrastructure::sources::YelpSource`] - Yelp Fusion
/// - [`crate::infrastructure::sources::GooglePlacesSource`] - Google Places
/// - [`crate::infrastructure::sources::MockSource`] - generated data
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaceSource: Send + Sync {
    /// Identifier of this source.
    fn id(&self) -> SourceId;

    /// Searches for businesses matching the query.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BudgetExceeded`] when a budget cap refuses the
    /// call and [`AppError::Upstream`] on provider failures.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Business>, AppError>;

    /// Fetches detailed information for a business.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(details))` when found
    /// - `Ok(None)` when the provider reports no such business
    ///
    /// # Errors
    ///
    /// Same cases as [`Self::search`].
    async fn details(&self, business_id: &str) -> Result<Option<BusinessDetails>, AppError>;

    /// Fetches reviews (or tips) for a business, newest first.
    ///
    /// Sources without review access return an empty list.
    ///
    /// # Errors
    ///
    /// Same cases as [`Self::search`].
    async fn reviews(&self, business_id: &str, limit: usize) -> Result<Vec<Review>, AppError>;

    /// Lists the categories the source can filter by.
    ///
    /// # Errors
    ///
    /// Same cases as [`Self::search`].
    async fn categories(&self) -> Result<Vec<Category>, AppError>;

    /// Lightweight connectivity check: runs a minimal search and returns
    /// the number of results. Used by the probe endpoint and the CLI.
    ///
    /// # Errors
    ///
    /// Same cases as [`Self::search`].
    async fn probe(&self) -> Result<usize, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query = SearchQuery::new("New York");
        assert_eq!(query.radius_meters, 5_000);
        assert_eq!(query.limit, 20);
        assert!(query.query.is_none());
    }

    #[test]
    fn test_radius_clamped_to_provider_cap() {
        let query = SearchQuery::new("Chicago").with_radius(250_000);
        assert_eq!(query.radius_meters, MAX_RADIUS_METERS);
    }

    #[test]
    fn test_limit_clamped_to_1_through_50() {
        assert_eq!(SearchQuery::new("x").with_limit(0).limit, 1);
        assert_eq!(SearchQuery::new("x").with_limit(200).limit, 50);
        assert_eq!(SearchQuery::new("x").with_limit(10).limit, 10);
    }

    #[test]
    fn test_empty_filters_dropped() {
        let query = SearchQuery::new("Miami")
            .with_query(Some(String::new()))
            .with_category(Some(String::new()));
        assert!(query.query.is_none());
        assert!(query.category.is_none());
    }
}
