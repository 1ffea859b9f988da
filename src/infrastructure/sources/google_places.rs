//! Google Places API client.
//!
//! Search and details only: review access requires billing tiers beyond the
//! free quota, so `reviews` always returns an empty list.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::budget::{BudgetTracker, ProviderThrottle};
use crate::domain::entities::{
    Business, BusinessDetails, Category, Coordinates, Review, SourceId,
};
use crate::domain::sources::{PlaceSource, SearchQuery};
use crate::error::AppError;
use crate::infrastructure::http::fetch_json;
use crate::utils::location;

const BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

const DETAILS_FIELDS: &str = "place_id,name,formatted_address,geometry,rating,user_ratings_total,\
                              price_level,opening_hours,types,website,formatted_phone_number";

/// Nearby search returns up to 20 results per page; only the first 10 are
/// kept to limit per-request cost.
const MAX_NEARBY_RESULTS: usize = 10;

/// Google Places API client (key-parameter auth).
pub struct GooglePlacesSource {
    client: reqwest::Client,
    api_key: String,
    budget: Arc<BudgetTracker>,
    throttle: ProviderThrottle,
}

impl GooglePlacesSource {
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
                "Google Places API key not configured",
                serde_json::json!({}),
            ));
        }

        info!("Google Places source initialized");

        Ok(Self {
            client,
            api_key,
            budget,
            throttle: ProviderThrottle::per_minute(upstream_rpm),
        })
    }

    async fn fetch(
        &self,
        endpoint: &'static str,
        path: &str,
        mut params: Vec<(String, String)>,
    ) -> Result<Value, AppError> {
        self.budget.can_spend(SourceId::GooglePlaces, endpoint)?;
        self.throttle.acquire().await;

        params.push(("key".to_string(), self.api_key.clone()));
        let url = format!("{}{}", BASE_URL, path);

        let data = fetch_json(SourceId::GooglePlaces, || {
            self.client.get(&url).query(&params)
        })
        .await
        .map_err(|e| e.into_app_error(SourceId::GooglePlaces))?;

        self.budget.record(SourceId::GooglePlaces, endpoint);
        Ok(data)
    }
}

/// Interprets the `status` field Google embeds in every response body.
///
/// `OK` and `ZERO_RESULTS` are success shapes; anything else is an
/// upstream failure carrying its own error message.
fn check_status(data: &Value) -> Result<bool, AppError> {
    let status = data.get("status").and_then(Value::as_str).unwrap_or("");

    match status {
        "OK" => Ok(true),
        "ZERO_RESULTS" | "NOT_FOUND" => Ok(false),
        other => Err(AppError::upstream(
            "Google Places API error",
            serde_json::json!({
                "status": other,
                "message": data.get("error_message").and_then(Value::as_str).unwrap_or(""),
            }),
        )),
    }
}

#[async_trait]
impl PlaceSource for GooglePlacesSource {
    fn id(&self) -> SourceId {
        SourceId::GooglePlaces
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Business>, AppError> {
        let coords = location::resolve_coordinates(&query.location);

        let mut params = vec![
            ("location".to_string(), location::format_lat_lng(&coords)),
            ("radius".to_string(), query.radius_meters.to_string()),
            (
                "type".to_string(),
                query
                    .category
                    .clone()
                    .unwrap_or_else(|| "restaurant".to_string()),
            ),
        ];

        if let Some(keyword) = &query.query {
            params.push(("keyword".to_string(), keyword.clone()));
        }

        debug!("Searching Google Places around {:?}", coords);

        let data = self.fetch("search", "/nearbysearch/json", params).await?;

        if !check_status(&data)? {
            return Ok(Vec::new());
        }

        let businesses = data
            .get("results")
            .and_then(Value::as_array)
            .map(|places| {
                places
                    .iter()
                    .take(MAX_NEARBY_RESULTS.min(query.limit))
                    .filter_map(parse_business)
                    .collect()
            })
            .unwrap_or_default();

        Ok(businesses)
    }

    async fn details(&self, place_id: &str) -> Result<Option<BusinessDetails>, AppError> {
        let params = vec![
            ("place_id".to_string(), place_id.to_string()),
            ("fields".to_string(), DETAILS_FIELDS.to_string()),
        ];

        let data = self.fetch("details", "/details/json", params).await?;

        if !check_status(&data)? {
            return Ok(None);
        }

        Ok(data.get("result").and_then(parse_details))
    }

    async fn reviews(&self, _place_id: &str, _limit: usize) -> Result<Vec<Review>, AppError> {
        // Review content requires additional permissions and billing.
        warn!("Google Places reviews require additional permissions and billing");
        Ok(Vec::new())
    }

    async fn categories(&self) -> Result<Vec<Category>, AppError> {
        // Google has no category-listing endpoint; the supported nearby
        // search types are a fixed, documented set.
        Ok(NEARBY_SEARCH_TYPES
            .iter()
            .map(|t| Category {
                id: Some((*t).to_string()),
                name: display_type_name(t),
                short_name: None,
                icon: None,
            })
            .collect())
    }

    async fn probe(&self) -> Result<usize, AppError> {
        let query = SearchQuery::new("New York").with_limit(2);
        let results = self.search(&query).await?;
        Ok(results.len())
    }
}

/// Place types accepted by nearby search, limited to the food/venue subset
/// this service targets.
const NEARBY_SEARCH_TYPES: &[&str] = &[
    "restaurant",
    "cafe",
    "bar",
    "bakery",
    "meal_delivery",
    "meal_takeaway",
    "night_club",
    "food",
];

fn display_type_name(raw: &str) -> String {
    raw.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Maps a nearby-search result into a [`Business`] summary.
fn parse_business(place: &Value) -> Option<Business> {
    let id = place.get("place_id").and_then(Value::as_str)?.to_string();

    let location = place
        .get("geometry")
        .and_then(|g| g.get("location"));

    let coordinates = match (
        location.and_then(|l| l.get("lat")).and_then(Value::as_f64),
        location.and_then(|l| l.get("lng")).and_then(Value::as_f64),
    ) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };

    let categories = place
        .get("types")
        .and_then(Value::as_array)
        .map(|types| {
            types
                .iter()
                .filter_map(Value::as_str)
                .map(|t| Category {
                    id: Some(t.to_string()),
                    name: display_type_name(t),
                    short_name: None,
                    icon: None,
                })
                .collect()
        })
        .unwrap_or_default();

    Some(Business {
        id,
        name: place
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string(),
        address: place
            .get("vicinity")
            .or_else(|| place.get("formatted_address"))
            .and_then(Value::as_str)
            .map(str::to_string),
        city: None,
        state: None,
        country: None,
        postal_code: None,
        coordinates,
        categories,
        rating: place.get("rating").and_then(Value::as_f64),
        review_count: place
            .get("user_ratings_total")
            .and_then(Value::as_u64)
            .map(|n| n as u32),
        // Google price_level is 0-4; 0 (free) maps below the 1-4 tiers.
        price: place
            .get("price_level")
            .and_then(Value::as_u64)
            .map(|p| p.min(4) as u8),
        distance_meters: None,
        popularity: None,
        phone: place
            .get("formatted_phone_number")
            .and_then(Value::as_str)
            .map(str::to_string),
        image_url: None,
        url: place
            .get("website")
            .and_then(Value::as_str)
            .map(str::to_string),
        source: SourceId::GooglePlaces,
    })
}

fn parse_details(place: &Value) -> Option<BusinessDetails> {
    let summary = parse_business(place)?;

    let mut details = BusinessDetails::from_summary(summary);
    details.website = place
        .get("website")
        .and_then(Value::as_str)
        .map(str::to_string);
    details.hours = parse_hours(place.get("opening_hours"));

    Some(details)
}

/// Splits `weekday_text` lines (`"Monday: 9:00 AM – 5:00 PM"`) into a
/// weekday table.
fn parse_hours(hours: Option<&Value>) -> BTreeMap<String, String> {
    let mut table = BTreeMap::new();

    let Some(lines) = hours
        .and_then(|h| h.get("weekday_text"))
        .and_then(Value::as_array)
    else {
        return table;
    };

    for line in lines.iter().filter_map(Value::as_str) {
        if let Some((day, range)) = line.split_once(": ") {
            table.insert(day.to_string(), range.to_string());
        }
    }

    table
}
