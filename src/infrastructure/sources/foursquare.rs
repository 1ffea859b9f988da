//! Foursquare Places v3 client.
//!
//! The primary real data source: its free tier (50K requests/month) covers
//! search, place details, tips, photos, and the category taxonomy.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::{WEEKDAYS, format_hhmm_range};
use crate::application::budget::{BudgetTracker, ProviderThrottle};
use crate::domain::entities::{
    Business, BusinessDetails, Category, Coordinates, Review, SourceId,
};
use crate::domain::sources::{PlaceSource, SearchQuery};
use crate::error::AppError;
use crate::infrastructure::http::{SourceError, fetch_json};
use crate::utils::location::{self, Location};

const BASE_URL: &str = "https://api.foursquare.com/v3";

const SEARCH_FIELDS: &str =
    "fsq_id,name,categories,location,geocodes,distance,rating,price,stats,hours,popularity";

const DETAILS_FIELDS: &str = "fsq_id,name,categories,location,geocodes,rating,price,stats,hours,\
                              popularity,website,tel,email,description,photos,social_media,verified";

/// Foursquare Places API client (v3, API-key auth).
pub struct FoursquareSource {
    client: reqwest::Client,
    api_key: String,
    budget: Arc<BudgetTracker>,
    throttle: ProviderThrottle,
}

impl FoursquareSource {
    /// Creates the client.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] when the API key is empty.
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        budget: Arc<BudgetTracker>,
        upstream_rpm: u32,
    ) -> Result<Self, AppError> {
        if api_key.is_empty() {
            return Err(AppError::unavailable(
                "Foursquare API key not configured",
                serde_json::json!({ "hint": "get free keys at https://foursquare.com/developers" }),
            ));
        }

        info!("Foursquare source initialized (free tier)");

        Ok(Self {
            client,
            api_key,
            budget,
            throttle: ProviderThrottle::per_minute(upstream_rpm),
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", BASE_URL, path))
            .header(header::AUTHORIZATION, &self.api_key)
            .header(header::ACCEPT, "application/json")
    }

    async fn fetch(
        &self,
        endpoint: &'static str,
        path: String,
        params: Vec<(String, String)>,
    ) -> Result<Value, AppError> {
        self.budget.can_spend(SourceId::Foursquare, endpoint)?;
        self.throttle.acquire().await;

        let data = fetch_json(SourceId::Foursquare, || self.get(&path).query(&params))
            .await
            .map_err(|e| e.into_app_error(SourceId::Foursquare))?;

        self.budget.record(SourceId::Foursquare, endpoint);
        Ok(data)
    }

    async fn fetch_photos(&self, fsq_id: &str, limit: usize) -> Result<Vec<String>, AppError> {
        let data = self
            .fetch(
                "photos",
                format!("/places/{}/photos", fsq_id),
                vec![("limit".to_string(), limit.min(50).to_string())],
            )
            .await?;

        let photos = data
            .as_array()
            .map(|items| items.iter().filter_map(parse_photo_url).collect())
            .unwrap_or_default();

        Ok(photos)
    }
}

#[async_trait]
impl PlaceSource for FoursquareSource {
    fn id(&self) -> SourceId {
        SourceId::Foursquare
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Business>, AppError> {
        let mut params: Vec<(String, String)> = Vec::new();

        match location::parse(&query.location) {
            Location::Near(name) => params.push(("near".to_string(), name)),
            Location::LatLng(coords) => {
                params.push(("ll".to_string(), location::format_lat_lng(&coords)));
            }
        }

        if let Some(q) = &query.query {
            params.push(("query".to_string(), q.clone()));
        }
        if let Some(category) = &query.category {
            params.push(("categories".to_string(), category.clone()));
        }

        params.push(("radius".to_string(), query.radius_meters.to_string()));
        params.push(("limit".to_string(), query.limit.to_string()));
        params.push(("fields".to_string(), SEARCH_FIELDS.to_string()));

        debug!("Searching Foursquare: {}", query.location);

        let data = self
            .fetch("search", "/places/search".to_string(), params)
            .await?;

        let businesses: Vec<Business> = data
            .get("results")
            .and_then(Value::as_array)
            .map(|places| {
                places
                    .iter()
                    .take(query.limit)
                    .filter_map(parse_business)
                    .collect()
            })
            .unwrap_or_default();

        debug!("Found {} businesses on Foursquare", businesses.len());
        Ok(businesses)
    }

    async fn details(&self, business_id: &str) -> Result<Option<BusinessDetails>, AppError> {
        self.budget.can_spend(SourceId::Foursquare, "details")?;
        self.throttle.acquire().await;

        let path = format!("/places/{}", business_id);
        let params = vec![("fields".to_string(), DETAILS_FIELDS.to_string())];

        let result = fetch_json(SourceId::Foursquare, || self.get(&path).query(&params)).await;

        let data = match result {
            Ok(data) => data,
            Err(SourceError::Status { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e.into_app_error(SourceId::Foursquare)),
        };

        self.budget.record(SourceId::Foursquare, "details");

        let Some(mut details) = parse_details(&data) else {
            return Ok(None);
        };

        // Photo URLs come from a separate endpoint; failures there don't
        // sink the whole details request.
        match self.fetch_photos(business_id, 5).await {
            Ok(photos) => details.photos = photos,
            Err(e) => error!("Foursquare photos error for {}: {}", business_id, e),
        }

        Ok(Some(details))
    }

    async fn reviews(&self, business_id: &str, limit: usize) -> Result<Vec<Review>, AppError> {
        let data = self
            .fetch(
                "reviews",
                format!("/places/{}/tips", business_id),
                vec![("limit".to_string(), limit.min(50).to_string())],
            )
            .await?;

        let tips = data
            .as_array()
            .map(|items| items.iter().take(limit).filter_map(parse_tip).collect())
            .unwrap_or_default();

        Ok(tips)
    }

    async fn categories(&self) -> Result<Vec<Category>, AppError> {
        let data = self
            .fetch(
                "categories",
                "/places/categories".to_string(),
                Vec::new(),
            )
            .await?;

        let categories = data
            .get("results")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(parse_category).collect())
            .unwrap_or_default();

        Ok(categories)
    }

    async fn probe(&self) -> Result<usize, AppError> {
        let query = SearchQuery::new("New York").with_limit(2);
        let results = self.search(&query).await?;
        Ok(results.len())
    }
}

/// Maps a v3 place object into a [`Business`] summary.
///
/// Returns `None` when the record has no `fsq_id`; partial records keep
/// whatever fields parsed.
fn parse_business(place: &Value) -> Option<Business> {
    let id = place.get("fsq_id").and_then(Value::as_str)?.to_string();

    let location = place.get("location");
    let geocode = place
        .get("geocodes")
        .and_then(|g| g.get("main"));

    let coordinates = match (
        geocode.and_then(|g| g.get("latitude")).and_then(Value::as_f64),
        geocode.and_then(|g| g.get("longitude")).and_then(Value::as_f64),
    ) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };

    let categories = place
        .get("categories")
        .and_then(Value::as_array)
        .map(|cats| cats.iter().filter_map(parse_category).collect())
        .unwrap_or_default();

    let loc_str = |key: &str| {
        location
            .and_then(|l| l.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    Some(Business {
        id,
        name: place
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string(),
        address: loc_str("formatted_address").or_else(|| loc_str("address")),
        city: loc_str("locality"),
        state: loc_str("region"),
        country: loc_str("country"),
        postal_code: loc_str("postcode"),
        coordinates,
        categories,
        rating: place.get("rating").and_then(Value::as_f64),
        review_count: place
            .get("stats")
            .and_then(|s| s.get("total_ratings"))
            .and_then(Value::as_u64)
            .map(|n| n as u32),
        price: place
            .get("price")
            .and_then(Value::as_u64)
            .map(|p| p.min(4) as u8),
        distance_meters: place
            .get("distance")
            .and_then(Value::as_u64)
            .map(|d| d as u32),
        popularity: place.get("popularity").and_then(Value::as_f64),
        phone: None,
        image_url: None,
        url: None,
        source: SourceId::Foursquare,
    })
}

fn parse_details(place: &Value) -> Option<BusinessDetails> {
    let summary = parse_business(place)?;
    let stats = place.get("stats");

    let stat = |key: &str| {
        stats
            .and_then(|s| s.get(key))
            .and_then(Value::as_u64)
            .map(|n| n as u32)
    };

    let mut details = BusinessDetails::from_summary(summary);
    details.summary.phone = place
        .get("tel")
        .and_then(Value::as_str)
        .map(str::to_string);
    details.website = place
        .get("website")
        .and_then(Value::as_str)
        .map(str::to_string);
    details.email = place
        .get("email")
        .and_then(Value::as_str)
        .map(str::to_string);
    details.description = place
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);
    details.hours = parse_hours(place.get("hours"));
    details.social_media = parse_social(place.get("social_media"));
    details.tips_count = stat("tip_count");
    details.users_count = stat("users_count");
    details.checkins_count = stat("checkins_count");
    details.verified = place
        .get("verified")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Some(details)
}

/// Maps v3 `hours.regular` entries (`day` 1=Monday..7=Sunday, `open`/`close`
/// as `HHMM`) to a weekday table.
fn parse_hours(hours: Option<&Value>) -> BTreeMap<String, String> {
    let mut table = BTreeMap::new();

    let Some(regular) = hours
        .and_then(|h| h.get("regular"))
        .and_then(Value::as_array)
    else {
        return table;
    };

    for slot in regular {
        let Some(day) = slot.get("day").and_then(Value::as_u64) else {
            continue;
        };
        let Some(day_name) = WEEKDAYS.get((day as usize).saturating_sub(1)) else {
            continue;
        };

        let open = slot.get("open").and_then(Value::as_str).unwrap_or("");
        let close = slot.get("close").and_then(Value::as_str).unwrap_or("");

        if let Some(range) = format_hhmm_range(open, close) {
            table.insert((*day_name).to_string(), range);
        }
    }

    table
}

fn parse_social(social: Option<&Value>) -> BTreeMap<String, String> {
    let mut table = BTreeMap::new();

    if let Some(obj) = social.and_then(Value::as_object) {
        for (network, handle) in obj {
            if let Some(handle) = handle.as_str() {
                table.insert(network.clone(), handle.to_string());
            }
        }
    }

    table
}

fn parse_category(cat: &Value) -> Option<Category> {
    let name = cat.get("name").and_then(Value::as_str)?.to_string();

    let id = match cat.get("id") {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    };

    Some(Category {
        id,
        name,
        short_name: cat
            .get("short_name")
            .and_then(Value::as_str)
            .map(str::to_string),
        icon: cat
            .get("icon")
            .and_then(|i| i.get("prefix"))
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

fn parse_photo_url(photo: &Value) -> Option<String> {
    let prefix = photo.get("prefix").and_then(Value::as_str)?;
    let suffix = photo.get("suffix").and_then(Value::as_str)?;
    Some(format!("{}original{}", prefix, suffix))
}

fn parse_tip(tip: &Value) -> Option<Review> {
    let id = tip.get("id").and_then(Value::as_str)?.to_string();
    let user = tip.get("user");

    let user_name = user.and_then(|u| u.get("name")).and_then(Value::as_str).map(str::to_string)
        .or_else(|| {
            let first = user
                .and_then(|u| u.get("first_name"))
                .and_then(Value::as_str)
                .unwrap_or("");
            let last = user
                .and_then(|u| u.get("last_name"))
                .and_then(Value::as_str)
                .unwrap_or("");
            let full = format!("{} {}", first, last).trim().to_string();
            if full.is_empty() { None } else { Some(full) }
        });

    let user_photo = user.and_then(|u| u.get("photo")).and_then(|photo| {
        let prefix = photo.get("prefix").and_then(Value::as_str)?;
        let suffix = photo.get("suffix").and_then(Value::as_str)?;
        Some(format!("{}100x100{}", prefix, suffix))
    });

    let created_at = tip
        .get("created_at")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Some(Review {
        id,
        text: tip
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        // Foursquare tips carry no rating.
        rating: None,
        user: user_name,
        user_photo,
        likes_count: tip
            .get("agree_count")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32,
        created_at,
        url: None,
        source: SourceId::Foursquare,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_place() -> Value {
        json!({
            "fsq_id": "4b5f0f",
            "name": "Central Perk",
            "categories": [
                {
                    "id": 13034,
                    "name": "Coffee Shop",
                    "short_name": "Coffee",
                    "icon": { "prefix": "https://ss3.4sqi.net/img/coffee_", "suffix": ".png" }
                }
            ],
            "location": {
                "formatted_address": "90 Bedford St, New York, NY 10014",
                "locality": "New York",
                "region": "NY",
                "country": "US",
                "postcode": "10014"
            },
            "geocodes": { "main": { "latitude": 40.7326, "longitude": -74.0051 } },
            "distance": 210,
            "rating": 8.7,
            "price": 2,
            "stats": { "total_ratings": 412, "tip_count": 88 },
            "popularity": 0.97
        })
    }

    #[test]
    fn test_parse_business() {
        let business = parse_business(&sample_place()).unwrap();

        assert_eq!(business.id, "4b5f0f");
        assert_eq!(business.name, "Central Perk");
        assert_eq!(business.city.as_deref(), Some("New York"));
        assert_eq!(business.rating, Some(8.7));
        assert_eq!(business.review_count, Some(412));
        assert_eq!(business.price, Some(2));
        assert_eq!(business.distance_meters, Some(210));
        assert_eq!(business.source, SourceId::Foursquare);

        let coords = business.coordinates.unwrap();
        assert_eq!(coords.latitude, 40.7326);

        assert_eq!(business.categories.len(), 1);
        assert_eq!(business.categories[0].name, "Coffee Shop");
        assert_eq!(business.categories[0].id.as_deref(), Some("13034"));
    }

    #[test]
    fn test_parse_business_without_id_is_none() {
        assert!(parse_business(&json!({ "name": "No Id" })).is_none());
    }

    #[test]
    fn test_parse_business_minimal_record() {
        let business = parse_business(&json!({ "fsq_id": "x1" })).unwrap();
        assert_eq!(business.name, "Unknown");
        assert!(business.coordinates.is_none());
        assert!(business.categories.is_empty());
    }

    #[test]
    fn test_parse_details_extended_fields() {
        let mut place = sample_place();
        place["website"] = json!("https://centralperk.example");
        place["tel"] = json!("+1 212 555 0100");
        place["description"] = json!("A coffee shop.");
        place["verified"] = json!(true);
        place["social_media"] = json!({ "instagram": "centralperk" });
        place["hours"] = json!({
            "regular": [
                { "day": 1, "open": "0900", "close": "1700" },
                { "day": 7, "open": "1000", "close": "1600" }
            ]
        });

        let details = parse_details(&place).unwrap();

        assert_eq!(details.website.as_deref(), Some("https://centralperk.example"));
        assert_eq!(details.summary.phone.as_deref(), Some("+1 212 555 0100"));
        assert!(details.verified);
        assert_eq!(details.tips_count, Some(88));
        assert_eq!(
            details.social_media.get("instagram").map(String::as_str),
            Some("centralperk")
        );
        assert_eq!(details.hours.get("Monday").map(String::as_str), Some("09:00 - 17:00"));
        assert_eq!(details.hours.get("Sunday").map(String::as_str), Some("10:00 - 16:00"));
    }

    #[test]
    fn test_parse_tip() {
        let tip = json!({
            "id": "t1",
            "created_at": "2026-05-01T12:00:00Z",
            "text": "Great espresso.",
            "agree_count": 4,
            "user": { "first_name": "Sam", "last_name": "Lee" }
        });

        let review = parse_tip(&tip).unwrap();

        assert_eq!(review.id, "t1");
        assert_eq!(review.user.as_deref(), Some("Sam Lee"));
        assert_eq!(review.likes_count, 4);
        assert!(review.rating.is_none());
        assert!(review.created_at.is_some());
    }

    #[test]
    fn test_parse_photo_url() {
        let photo = json!({ "prefix": "https://fastly.4sqi.net/img/general/", "suffix": "/abc.jpg" });
        assert_eq!(
            parse_photo_url(&photo).as_deref(),
            Some("https://fastly.4sqi.net/img/general/original/abc.jpg")
        );
    }
}
