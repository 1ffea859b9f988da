//! DTOs for the business search endpoint.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use std::sync::LazyLock;
use validator::Validate;

use crate::domain::entities::{Business, SourceId};

/// Compiled regex for provider category filters.
static CATEGORY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9 ,&_-]+$").unwrap());

fn default_source() -> String {
    "auto".to_string()
}

/// Query parameters for `GET /api/v1/search`.
///
/// Uses `serde_with` to parse numeric values from query strings.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct SearchParams {
    /// Free-text place name or `"lat,lng"`. Defaults to the configured
    /// `DEFAULT_LOCATION` when absent.
    #[validate(length(min = 1, max = 120))]
    pub location: Option<String>,

    /// Source selector: `auto` (default) or an explicit source name.
    #[serde(default = "default_source")]
    pub source: String,

    #[validate(length(max = 120))]
    pub query: Option<String>,

    /// Category filter (provider category name or id).
    #[validate(length(max = 80))]
    #[validate(regex(path = "*CATEGORY_REGEX"))]
    pub category: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub radius: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Where a response body came from.
#[derive(Debug, Serialize)]
pub struct CacheInfo {
    pub cached: bool,
    /// `"cache"`, `"live_api"`, or `"generated"`.
    pub source: &'static str,
}

impl CacheInfo {
    /// Builds the provenance block from the serving source and cache state.
    pub fn new(source: SourceId, cached: bool) -> Self {
        let origin = if cached {
            "cache"
        } else if source.is_real() {
            "live_api"
        } else {
            "generated"
        };

        Self {
            cached,
            source: origin,
        }
    }
}

/// Response envelope for search results.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub source: SourceId,
    pub location: String,
    pub query: String,
    pub category: String,
    pub count: usize,
    pub businesses: Vec<Business>,
    pub timestamp: String,
    pub cache_info: CacheInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_info_live_api() {
        let info = CacheInfo::new(SourceId::Foursquare, false);
        assert!(!info.cached);
        assert_eq!(info.source, "live_api");
    }

    #[test]
    fn test_cache_info_generated() {
        let info = CacheInfo::new(SourceId::Mock, false);
        assert_eq!(info.source, "generated");
    }

    #[test]
    fn test_cache_info_cached() {
        let info = CacheInfo::new(SourceId::Foursquare, true);
        assert!(info.cached);
        assert_eq!(info.source, "cache");
    }

    #[test]
    fn test_params_parse_numeric_strings() {
        let params: SearchParams =
            serde_json::from_str(r#"{"location": "New York", "limit": "15", "radius": "2500"}"#)
                .unwrap();

        assert_eq!(params.limit, Some(15));
        assert_eq!(params.radius, Some(2500));
        assert_eq!(params.source, "auto");
    }

    #[test]
    fn test_params_reject_invalid_category_characters() {
        let params: SearchParams =
            serde_json::from_str(r#"{"category": "coffee<script>"}"#).unwrap();

        assert!(params.validate().is_err());
    }

    #[test]
    fn test_params_accept_plain_category() {
        let params: SearchParams =
            serde_json::from_str(r#"{"category": "Coffee Shop, Cafe"}"#).unwrap();

        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_params_reject_empty_location() {
        let params: SearchParams = serde_json::from_str(r#"{"location": ""}"#).unwrap();
        assert!(params.validate().is_err());
    }
}
