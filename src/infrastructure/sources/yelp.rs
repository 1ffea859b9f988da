//! Yelp Fusion API client.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::{WEEKDAYS, format_hhmm_range};
use crate::application::budget::{BudgetTracker, ProviderThrottle};
use crate::domain::entities::{
    Business, BusinessDetails, Category, Coordinates, Review, SourceId,
};
use crate::domain::sources::{PlaceSource, SearchQuery};
use crate::error::AppError;
use crate::infrastructure::http::{SourceError, fetch_json};

const BASE_URL: &str = "https://api.yelp.com/v3";

/// Yelp caps search radius at 40 km.
const MAX_YELP_RADIUS: u32 = 40_000;

/// Yelp Fusion API client (Bearer-token auth).
pub struct YelpSource {
    client: reqwest::Client,
    api_key: String,
    budget: Arc<BudgetTracker>,
    throttle: ProviderThrottle,
}

impl YelpSource {
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
                "Yelp API key not configured",
                serde_json::json!({}),
            ));
        }

        info!("Yelp source initialized");

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
            .bearer_auth(&self.api_key)
            .header(header::ACCEPT, "application/json")
    }

    async fn fetch(
        &self,
        endpoint: &'static str,
        path: String,
        params: Vec<(String, String)>,
    ) -> Result<Value, AppError> {
        self.budget.can_spend(SourceId::Yelp, endpoint)?;
        self.throttle.acquire().await;

        let data = fetch_json(SourceId::Yelp, || self.get(&path).query(&params))
            .await
            .map_err(|e| e.into_app_error(SourceId::Yelp))?;

        self.budget.record(SourceId::Yelp, endpoint);
        Ok(data)
    }
}

#[async_trait]
impl PlaceSource for YelpSource {
    fn id(&self) -> SourceId {
        SourceId::Yelp
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Business>, AppError> {
        let mut params = vec![
            ("location".to_string(), query.location.clone()),
            ("limit".to_string(), query.limit.to_string()),
            (
                "radius".to_string(),
                query.radius_meters.min(MAX_YELP_RADIUS).to_string(),
            ),
        ];

        if let Some(term) = &query.query {
            params.push(("term".to_string(), term.clone()));
        }
        if let Some(categories) = &query.category {
            params.push(("categories".to_string(), categories.clone()));
        }

        debug!("Searching Yelp: {}", query.location);

        let data = self
            .fetch("search", "/businesses/search".to_string(), params)
            .await?;

        let businesses = data
            .get("businesses")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(parse_business).collect())
            .unwrap_or_default();

        Ok(businesses)
    }

    async fn details(&self, business_id: &str) -> Result<Option<BusinessDetails>, AppError> {
        self.budget.can_spend(SourceId::Yelp, "details")?;
        self.throttle.acquire().await;

        let path = format!("/businesses/{}", business_id);

        let result = fetch_json(SourceId::Yelp, || self.get(&path)).await;

        let data = match result {
            Ok(data) => data,
            Err(SourceError::Status { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e.into_app_error(SourceId::Yelp)),
        };

        self.budget.record(SourceId::Yelp, "details");

        Ok(parse_details(&data))
    }

    async fn reviews(&self, business_id: &str, limit: usize) -> Result<Vec<Review>, AppError> {
        let data = self
            .fetch(
                "reviews",
                format!("/businesses/{}/reviews", business_id),
                vec![("limit".to_string(), limit.min(50).to_string())],
            )
            .await?;

        let reviews = data
            .get("reviews")
            .and_then(Value::as_array)
            .map(|items| items.iter().take(limit).filter_map(parse_review).collect())
            .unwrap_or_default();

        Ok(reviews)
    }

    async fn categories(&self) -> Result<Vec<Category>, AppError> {
        let data = self
            .fetch("categories", "/categories".to_string(), Vec::new())
            .await?;

        let categories = data
            .get("categories")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|cat| {
                        let title = cat.get("title").and_then(Value::as_str)?;
                        Some(Category {
                            id: cat
                                .get("alias")
                                .and_then(Value::as_str)
                                .map(str::to_string),
                            name: title.to_string(),
                            short_name: None,
                            icon: None,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(categories)
    }

    async fn probe(&self) -> Result<usize, AppError> {
        let query = SearchQuery::new("New York").with_limit(2);
        let results = self.search(&query).await?;
        Ok(results.len())
    }
}

/// Maps a Yelp business object into a [`Business`] summary.
fn parse_business(business: &Value) -> Option<Business> {
    let id = business.get("id").and_then(Value::as_str)?.to_string();

    let location = business.get("location");
    let coordinates = business.get("coordinates");

    let address = location
        .and_then(|l| l.get("display_address"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|s| !s.is_empty());

    let loc_str = |key: &str| {
        location
            .and_then(|l| l.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let coords = match (
        coordinates
            .and_then(|c| c.get("latitude"))
            .and_then(Value::as_f64),
        coordinates
            .and_then(|c| c.get("longitude"))
            .and_then(Value::as_f64),
    ) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };

    let categories = business
        .get("categories")
        .and_then(Value::as_array)
        .map(|cats| {
            cats.iter()
                .filter_map(|cat| {
                    let title = cat.get("title").and_then(Value::as_str)?;
                    Some(Category {
                        id: cat
                            .get("alias")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        name: title.to_string(),
                        short_name: None,
                        icon: None,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Some(Business {
        id,
        name: business
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string(),
        address,
        city: loc_str("city"),
        state: loc_str("state"),
        country: loc_str("country"),
        postal_code: loc_str("zip_code"),
        coordinates: coords,
        categories,
        rating: business.get("rating").and_then(Value::as_f64),
        review_count: business
            .get("review_count")
            .and_then(Value::as_u64)
            .map(|n| n as u32),
        // Yelp reports price as "$".."$$$$"; the tier is its length.
        price: business
            .get("price")
            .and_then(Value::as_str)
            .map(|p| p.chars().count().min(4) as u8),
        distance_meters: business
            .get("distance")
            .and_then(Value::as_f64)
            .map(|d| d as u32),
        popularity: None,
        phone: business
            .get("display_phone")
            .and_then(Value::as_str)
            .map(str::to_string),
        image_url: business
            .get("image_url")
            .and_then(Value::as_str)
            .map(str::to_string),
        url: business
            .get("url")
            .and_then(Value::as_str)
            .map(str::to_string),
        source: SourceId::Yelp,
    })
}

fn parse_details(business: &Value) -> Option<BusinessDetails> {
    let summary = parse_business(business)?;

    let mut details = BusinessDetails::from_summary(summary);
    details.hours = parse_hours(business.get("hours"));
    details.photos = business
        .get("photos")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(details)
}

/// Maps Yelp's `hours[0].open` slots (`day` 0=Monday..6=Sunday, `start`/`end`
/// as `HHMM`) to a weekday table.
fn parse_hours(hours: Option<&Value>) -> BTreeMap<String, String> {
    let mut table = BTreeMap::new();

    let Some(open_slots) = hours
        .and_then(Value::as_array)
        .and_then(|h| h.first())
        .and_then(|h| h.get("open"))
        .and_then(Value::as_array)
    else {
        return table;
    };

    for slot in open_slots {
        let Some(day) = slot.get("day").and_then(Value::as_u64) else {
            continue;
        };
        let Some(day_name) = WEEKDAYS.get(day as usize) else {
            continue;
        };

        let start = slot.get("start").and_then(Value::as_str).unwrap_or("");
        let end = slot.get("end").and_then(Value::as_str).unwrap_or("");

        if let Some(range) = format_hhmm_range(start, end) {
            table.insert((*day_name).to_string(), range);
        }
    }

    table
}

fn parse_review(review: &Value) -> Option<Review> {
    let id = review.get("id").and_then(Value::as_str)?.to_string();
    let user = review.get("user");

    // Yelp timestamps look like "2026-03-14 18:21:07" in UTC.
    let created_at = review
        .get("time_created")
        .and_then(Value::as_str)
        .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok())
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));

    Some(Review {
        id,
        text: review
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        rating: review.get("rating").and_then(Value::as_f64),
        user: user
            .and_then(|u| u.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string),
        user_photo: user
            .and_then(|u| u.get("image_url"))
            .and_then(Value::as_str)
            .map(str::to_string),
        likes_count: 0,
        created_at,
        url: review
            .get("url")
            .and_then(Value::as_str)
            .map(str::to_string),
        source: SourceId::Yelp,
    })
}
