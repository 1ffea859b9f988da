//! # Insighthub
//!
//! A business intelligence ingestion service aggregating place and review
//! data from third-party APIs, built with Axum and Redis.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Core entities and the data source trait
//! - **Application Layer** ([`application`]) - Budget enforcement and orchestration
//! - **Infrastructure Layer** ([`infrastructure`]) - Cache, HTTP plumbing, provider clients
//! - **API Layer** ([`api`]) - REST handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - Multi-source place search (Foursquare, Yelp, Google Places, mock)
//! - Budget enforcement with a persistent usage ledger
//! - Per-provider outbound throttling and transient-failure retry
//! - Redis read-through caching with graceful degradation
//! - Automatic mock fallback when a real source fails
//! - Competitor analysis over normalized cross-source ratings
//!
//! ## Quick Start
//!
//! ```bash
//! # Set required environment variables
//! export SECRET_KEY="change-me"
//! export REDIS_URL="redis://localhost:6379"   # Optional
//! export FOURSQUARE_API_KEY="fsq3..."         # Optional
//! export USE_MOCK_DATA="false"                # Defaults to true
//!
//! # Start the service
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via
//! [`config::Config`]. See the [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::budget::BudgetTracker;
    pub use crate::application::services::{CollectorService, CompetitorService};
    pub use crate::domain::entities::{Business, BusinessDetails, Review, SourceId};
    pub use crate::domain::sources::{PlaceSource, SearchQuery};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
