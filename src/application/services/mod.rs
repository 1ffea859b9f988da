//! Application services orchestrating sources, cache, and budget.

mod collector_service;
mod competitor_service;

pub use collector_service::{
    CollectorService, DetailsOutcome, ProbeOutcome, ReviewsOutcome, SearchOutcome, SourceInfo,
};
pub use competitor_service::{CompetitorAnalysis, CompetitorService};
