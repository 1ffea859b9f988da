//! DTOs for the competitor analysis endpoint.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use crate::application::services::CompetitorAnalysis;
use crate::domain::entities::{Business, SourceId};

/// Query parameters for `GET /api/v1/competitors`.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct CompetitorsParams {
    /// Target business name. Required.
    #[validate(length(max = 120))]
    pub business: Option<String>,

    #[validate(length(max = 120))]
    pub location: Option<String>,

    #[validate(length(max = 80))]
    pub category: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Aggregate statistics over the competitor set.
#[derive(Debug, Serialize)]
pub struct AnalysisBlock {
    pub average_competitor_rating: f64,
    pub weighted_competitor_rating: f64,
    pub average_competitor_reviews: f64,
    pub market_saturation: usize,
}

/// Response envelope for competitor analysis.
#[derive(Debug, Serialize)]
pub struct CompetitorsResponse {
    pub success: bool,
    pub source: SourceId,
    pub target_business: String,
    pub competitors_count: usize,
    pub competitors: Vec<Business>,
    pub analysis: AnalysisBlock,
}

impl From<CompetitorAnalysis> for CompetitorsResponse {
    fn from(analysis: CompetitorAnalysis) -> Self {
        Self {
            success: true,
            source: analysis.source,
            target_business: analysis.target_business,
            competitors_count: analysis.competitors.len(),
            analysis: AnalysisBlock {
                average_competitor_rating: analysis.average_rating,
                weighted_competitor_rating: analysis.weighted_rating,
                average_competitor_reviews: analysis.average_review_count,
                market_saturation: analysis.market_saturation,
            },
            competitors: analysis.competitors,
        }
    }
}
