//! Review entity covering Yelp reviews, Foursquare tips, and mock data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SourceId;

/// A user review or tip for a business.
///
/// Foursquare tips carry no rating; `rating` is `None` for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_photo: Option<String>,

    #[serde(default)]
    pub likes_count: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub source: SourceId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tip_without_rating_serializes_without_field() {
        let review = Review {
            id: "tip_1".to_string(),
            text: "Try the cold brew.".to_string(),
            rating: None,
            user: Some("Alex".to_string()),
            user_photo: None,
            likes_count: 3,
            created_at: None,
            url: None,
            source: SourceId::Foursquare,
        };

        let json = serde_json::to_value(&review).unwrap();
        assert!(json.get("rating").is_none());
        assert_eq!(json["likes_count"], 3);
    }
}
