//! Competitor discovery and lightweight market analysis.

use serde::Serialize;
use std::sync::Arc;

use super::CollectorService;
use crate::domain::entities::{Business, SourceId};
use crate::domain::sources::SearchQuery;
use crate::error::AppError;
use crate::utils::normalize::{normalized_rating, weighted_score};

/// Analysis of the competitive field around a target business.
#[derive(Debug, Clone, Serialize)]
pub struct CompetitorAnalysis {
    pub source: SourceId,
    pub target_business: String,
    pub competitors: Vec<Business>,
    /// Mean competitor rating on the common 0-5 scale.
    pub average_rating: f64,
    /// Competitor rating weighted by review volume, 0-5 scale.
    pub weighted_rating: f64,
    pub average_review_count: f64,
    pub market_saturation: usize,
}

/// Finds competitors of a named business in an area and summarizes them.
pub struct CompetitorService {
    collector: Arc<CollectorService>,
}

impl CompetitorService {
    pub fn new(collector: Arc<CollectorService>) -> Self {
        Self { collector }
    }

    /// Searches the area, drops the target business itself, and computes
    /// aggregate rating statistics over the remainder.
    ///
    /// Fetches `2 × limit` results so that filtering out the target still
    /// leaves a full page of competitors.
    ///
    /// # Errors
    ///
    /// Propagates search errors from the collector.
    pub async fn analyze(
        &self,
        business_name: &str,
        location: &str,
        category: Option<String>,
        limit: usize,
    ) -> Result<CompetitorAnalysis, AppError> {
        let query = SearchQuery::new(location)
            .with_query(category.clone())
            .with_limit(limit * 2);

        let outcome = self.collector.search("auto", &query).await?;

        let target = business_name.to_lowercase();
        let competitors: Vec<Business> = outcome
            .businesses
            .into_iter()
            .filter(|b| !b.name.to_lowercase().contains(&target))
            .take(limit)
            .collect();

        let rated: Vec<(f64, u32)> = competitors
            .iter()
            .filter_map(|b| {
                b.rating.map(|r| {
                    (
                        normalized_rating(r, b.source),
                        b.review_count.unwrap_or(0),
                    )
                })
            })
            .collect();

        let average_rating = if rated.is_empty() {
            0.0
        } else {
            rated.iter().map(|(r, _)| r).sum::<f64>() / rated.len() as f64
        };

        let average_review_count = if competitors.is_empty() {
            0.0
        } else {
            competitors
                .iter()
                .map(|b| f64::from(b.review_count.unwrap_or(0)))
                .sum::<f64>()
                / competitors.len() as f64
        };

        Ok(CompetitorAnalysis {
            source: outcome.source,
            target_business: business_name.to_string(),
            market_saturation: competitors.len(),
            average_rating: round2(average_rating),
            weighted_rating: round2(weighted_score(&rated)),
            average_review_count: average_review_count.round(),
            competitors,
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
