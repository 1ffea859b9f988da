//! HTTP server initialization and runtime setup.
//!
//! Handles cache setup, budget ledger loading, source registration, and
//! Axum server lifecycle.

use crate::application::budget::BudgetTracker;
use crate::application::services::{CollectorService, CompetitorService};
use crate::config::Config;
use crate::domain::entities::SourceId;
use crate::domain::sources::PlaceSource;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::http::build_client;
use crate::infrastructure::sources::{
    FoursquareSource, GooglePlacesSource, MockSource, YelpSource,
};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::secrets::fingerprint_api_key;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Redis cache (or NullCache fallback)
/// - Budget ledger
/// - Data source registry (mock always; real sources per configured keys)
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - The HTTP client cannot be built
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let budget = Arc::new(BudgetTracker::load(
        &config.budget_file,
        config.max_requests_per_day,
        config.max_total_cost,
        config.use_mock_data,
    ));

    let sources = build_sources(&config, budget.clone())?;
    let key_fingerprints = fingerprints(&config);

    let collector = Arc::new(CollectorService::new(sources, cache.clone()));
    let competitors = Arc::new(CompetitorService::new(collector.clone()));

    let state = AppState {
        collector,
        competitors,
        budget,
        cache,
        default_location: config.default_location.clone(),
        use_mock_data: config.use_mock_data,
        key_fingerprints,
    };

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .await?;

    Ok(())
}

/// Builds the source registry.
///
/// The mock source is always present. Real sources register only when
/// their credential is configured and mock-data mode is off; a failed
/// client construction logs a warning instead of aborting startup.
fn build_sources(
    config: &Config,
    budget: Arc<BudgetTracker>,
) -> Result<Vec<Arc<dyn PlaceSource>>> {
    let mut sources: Vec<Arc<dyn PlaceSource>> = vec![Arc::new(MockSource::new())];

    if config.use_mock_data {
        tracing::info!("Mock data mode: real sources are disabled");
        return Ok(sources);
    }

    if !config.has_real_sources() {
        tracing::warn!("No provider API keys configured. Using mock data only.");
        tracing::info!("Get free Foursquare keys at: https://foursquare.com/developers");
        return Ok(sources);
    }

    // Foursquare tolerates slower responses than the others.
    let client = build_client(Duration::from_secs(10))?;
    let foursquare_client = build_client(Duration::from_secs(15))?;

    if let Some(key) = &config.foursquare_api_key {
        match FoursquareSource::new(
            foursquare_client,
            key.clone(),
            budget.clone(),
            config.upstream_rpm,
        ) {
            Ok(source) => sources.push(Arc::new(source)),
            Err(e) => tracing::warn!("Foursquare initialization failed: {}", e),
        }
    }

    if let Some(key) = &config.yelp_api_key {
        match YelpSource::new(
            client.clone(),
            key.clone(),
            budget.clone(),
            config.upstream_rpm,
        ) {
            Ok(source) => sources.push(Arc::new(source)),
            Err(e) => tracing::warn!("Yelp initialization failed: {}", e),
        }
    }

    if let Some(key) = &config.google_places_api_key {
        match GooglePlacesSource::new(client, key.clone(), budget, config.upstream_rpm) {
            Ok(source) => sources.push(Arc::new(source)),
            Err(e) => tracing::warn!("Google Places initialization failed: {}", e),
        }
    }

    Ok(sources)
}

/// Fingerprints every configured provider key for the sources endpoint.
fn fingerprints(config: &Config) -> BTreeMap<SourceId, String> {
    let mut map = BTreeMap::new();

    for (id, key) in [
        (SourceId::Foursquare, &config.foursquare_api_key),
        (SourceId::Yelp, &config.yelp_api_key),
        (SourceId::GooglePlaces, &config.google_places_api_key),
    ] {
        if let Some(key) = key {
            map.insert(id, fingerprint_api_key(key, &config.secret_key));
        }
    }

    map
}
