//! Business entities: the normalized record every source maps into.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Category, SourceId};

/// Geographic point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A business/place summary, normalized from provider-specific payloads.
///
/// `rating` keeps the provider's native scale (Foursquare rates 0-10,
/// Yelp and Google 0-5); cross-source comparisons go through
/// [`crate::utils::normalize::normalized_rating`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub id: String,
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,

    /// Price tier on a 1-4 scale (Foursquare/Google style).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u8>,

    /// Distance from the search point in meters, when the provider reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub source: SourceId,
}

impl Business {
    /// Category display names, in provider order.
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// Returns true when the record came from the mock generator.
    pub fn is_mock(&self) -> bool {
        self.source == SourceId::Mock
    }
}

/// Detailed business record returned by the details endpoints.
///
/// The summary fields are flattened into the same JSON object, mirroring
/// the shape search results use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessDetails {
    #[serde(flatten)]
    pub summary: Business,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Opening hours keyed by weekday name (`"Monday"` → `"09:00 - 17:00"`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hours: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,

    /// Social profile links keyed by network name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub social_media: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tips_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkins_count: Option<u32>,

    #[serde(default)]
    pub verified: bool,
}

impl BusinessDetails {
    /// Wraps a summary with no extended attributes.
    pub fn from_summary(summary: Business) -> Self {
        Self {
            summary,
            website: None,
            email: None,
            description: None,
            hours: BTreeMap::new(),
            photos: Vec::new(),
            social_media: BTreeMap::new(),
            tips_count: None,
            users_count: None,
            checkins_count: None,
            verified: false,
        }
    }
}
