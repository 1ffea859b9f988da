//! Generated mock data source for development and testing.
//!
//! Mimics the structure of real provider responses without any network
//! traffic. Records are generated deterministically from the business id,
//! so `details("mock_3")` always describes the same place.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use tracing::{debug, info};

use crate::domain::entities::{
    Business, BusinessDetails, Category, Coordinates, Review, SourceId,
};
use crate::domain::sources::{PlaceSource, SearchQuery};
use crate::error::AppError;

/// Business archetypes: name, categories, price tier, typical rating (0-5).
const TEMPLATES: &[(&str, &[&str], u8, f64)] = &[
    ("Central Perk", &["Coffee Shop", "Cafe"], 2, 4.3),
    ("Monk's Cafe", &["American Restaurant", "Diner"], 2, 3.9),
    ("Pizza Palace", &["Pizza Place", "Italian Restaurant"], 1, 4.1),
    ("Sushi Zen", &["Japanese Restaurant", "Sushi Restaurant"], 3, 4.6),
    ("Burger Joint", &["Burger Joint", "Fast Food Restaurant"], 1, 3.8),
    ("Green Leaf", &["Vegetarian Restaurant", "Healthy Restaurant"], 2, 4.4),
    ("Steak House", &["Steakhouse", "Fine Dining"], 4, 4.7),
    ("Taco Fiesta", &["Mexican Restaurant", "Taco Place"], 1, 4.0),
];

const CITIES: &[(&str, f64, f64)] = &[
    ("New York", 40.7128, -74.0060),
    ("Los Angeles", 34.0522, -118.2437),
    ("Chicago", 41.8781, -87.6298),
    ("Houston", 29.7604, -95.3698),
    ("Miami", 25.7617, -80.1918),
    ("London", 51.5074, -0.1278),
    ("Tokyo", 35.6762, 139.6503),
    ("Sydney", -33.8688, 151.2093),
];

const STREETS: &[&str] = &[
    "Main", "Oak", "Pine", "Maple", "Elm", "Cedar", "Washington", "Broadway",
];

const STREET_SUFFIXES: &[&str] = &["St", "Ave", "Blvd", "Rd", "Ln", "Dr"];

const POSITIVE_REVIEWS: &[&str] = &[
    "Great food and excellent service!",
    "Loved the atmosphere, will definitely return.",
    "Best in town, highly recommended!",
    "Fresh ingredients and friendly staff.",
    "Worth every penny, amazing experience.",
];

const NEGATIVE_REVIEWS: &[&str] = &[
    "Food was cold and service was slow.",
    "Overpriced for what you get.",
    "Not as good as the reviews suggested.",
    "Wait time was too long.",
    "Average at best, won't return.",
];

const NEUTRAL_REVIEWS: &[&str] = &[
    "Decent place, nothing special.",
    "Good for a quick meal.",
    "Average experience overall.",
    "Food was okay, service was fine.",
    "Met expectations but didn't exceed them.",
];

/// Cap on generated results per search.
const MAX_MOCK_RESULTS: usize = 20;

/// Always-available data source backed by a deterministic generator.
pub struct MockSource;

impl MockSource {
    pub fn new() -> Self {
        info!("Mock data source initialized");
        Self
    }

    /// Picks the city for a free-text location, defaulting to New York.
    fn extract_city(location: &str) -> &'static str {
        let lower = location.to_lowercase();
        CITIES
            .iter()
            .find(|(city, _, _)| lower.contains(&city.to_lowercase()))
            .map(|(city, _, _)| *city)
            .unwrap_or("New York")
    }

    fn seeded_rng(city: &str, index: usize) -> StdRng {
        let mut hasher = DefaultHasher::new();
        city.hash(&mut hasher);
        index.hash(&mut hasher);
        StdRng::seed_from_u64(hasher.finish())
    }

    /// Generates the `index`-th business for a city.
    fn generate_business(city: &'static str, index: usize) -> Business {
        let (name, categories, price, typical_rating) = TEMPLATES[index % TEMPLATES.len()];
        let (_, base_lat, base_lng) = CITIES
            .iter()
            .find(|(c, _, _)| *c == city)
            .copied()
            .unwrap_or(CITIES[0]);

        let mut rng = Self::seeded_rng(city, index);

        let street_no: u32 = rng.random_range(100..1000);
        let street = STREETS[rng.random_range(0..STREETS.len())];
        let suffix = STREET_SUFFIXES[rng.random_range(0..STREET_SUFFIXES.len())];

        let rating = (typical_rating + rng.random_range(-0.3..0.3)).clamp(1.0, 5.0);
        let rating = (rating * 10.0).round() / 10.0;

        Business {
            id: format!("mock_{}", index),
            name: name.to_string(),
            address: Some(format!("{} {} {}, {}", street_no, street, suffix, city)),
            city: Some(city.to_string()),
            state: None,
            country: None,
            postal_code: None,
            coordinates: Some(Coordinates {
                latitude: base_lat + rng.random_range(-0.05..0.05),
                longitude: base_lng + rng.random_range(-0.05..0.05),
            }),
            categories: categories.iter().map(|c| Category::named(*c)).collect(),
            rating: Some(rating),
            review_count: Some(rng.random_range(10..2000)),
            price: Some(price),
            distance_meters: Some(rng.random_range(50..5000)),
            popularity: Some(rng.random_range(0.3..1.0)),
            phone: Some(format!(
                "({}) {}-{}",
                rng.random_range(200..999),
                rng.random_range(100..999),
                rng.random_range(1000..9999)
            )),
            image_url: None,
            url: None,
            source: SourceId::Mock,
        }
    }

    fn slug(name: &str) -> String {
        name.to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect()
    }

    fn generate_hours(rng: &mut StdRng) -> BTreeMap<String, String> {
        let mut hours = BTreeMap::new();
        for day in [
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
            "Sunday",
        ] {
            let open: u32 = rng.random_range(6..11);
            let close: u32 = rng.random_range(17..23);
            hours.insert(
                day.to_string(),
                format!("{:02}:00 - {:02}:00", open, close),
            );
        }
        hours
    }

    /// Parses `mock_<n>` ids; anything else belongs to another source.
    fn parse_index(business_id: &str) -> Option<usize> {
        business_id.strip_prefix("mock_")?.parse().ok()
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlaceSource for MockSource {
    fn id(&self) -> SourceId {
        SourceId::Mock
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Business>, AppError> {
        let city = Self::extract_city(&query.location);
        debug!("Generating mock data for {} (limit {})", city, query.limit);

        let mut businesses = Vec::new();

        for index in 0..query.limit.min(MAX_MOCK_RESULTS) {
            let business = Self::generate_business(city, index);

            if let Some(term) = &query.query {
                if !business.name.to_lowercase().contains(&term.to_lowercase()) {
                    continue;
                }
            }

            if let Some(category) = &query.category {
                let wanted = category.to_lowercase();
                let matches = business
                    .categories
                    .iter()
                    .any(|c| c.name.to_lowercase().contains(&wanted));
                if !matches {
                    continue;
                }
            }

            businesses.push(business);
        }

        Ok(businesses)
    }

    async fn details(&self, business_id: &str) -> Result<Option<BusinessDetails>, AppError> {
        let Some(index) = Self::parse_index(business_id) else {
            return Ok(None);
        };

        let (city, _, _) = CITIES[index % CITIES.len()];
        let summary = Self::generate_business(city, index);
        let slug = Self::slug(&summary.name);

        let mut rng = Self::seeded_rng(city, index);
        let mut details = BusinessDetails::from_summary(summary);

        details.website = Some(format!("https://www.{}.com", slug));
        details.email = Some(format!("contact@{}.com", slug));
        details.description = Some(format!(
            "{} is a popular {} spot in {}.",
            details.summary.name,
            details
                .summary
                .categories
                .first()
                .map(|c| c.name.to_lowercase())
                .unwrap_or_else(|| "dining".to_string()),
            city
        ));
        details.social_media = BTreeMap::from([
            (
                "facebook".to_string(),
                format!("https://facebook.com/{}", slug),
            ),
            (
                "instagram".to_string(),
                format!("https://instagram.com/{}", slug),
            ),
        ]);
        details.photos = (0..5)
            .map(|i| format!("https://photos.mock.local/{}/{}.jpg", slug, i))
            .collect();
        details.hours = Self::generate_hours(&mut rng);
        details.tips_count = Some(rng.random_range(10..500));
        details.users_count = Some(rng.random_range(100..5000));
        details.checkins_count = Some(rng.random_range(100..10000));
        details.verified = rng.random_range(0..10) > 4;

        Ok(Some(details))
    }

    async fn reviews(&self, business_id: &str, limit: usize) -> Result<Vec<Review>, AppError> {
        let Some(index) = Self::parse_index(business_id) else {
            return Ok(Vec::new());
        };

        let mut rng = Self::seeded_rng(business_id, index);
        let now = Utc::now();
        let mut reviews = Vec::with_capacity(limit);

        for i in 0..limit {
            // 60% positive, 20% negative, 20% neutral.
            let roll: u32 = rng.random_range(0..10);
            let (pool, rating_range) = if roll < 6 {
                (POSITIVE_REVIEWS, 4..6)
            } else if roll < 8 {
                (NEGATIVE_REVIEWS, 1..3)
            } else {
                (NEUTRAL_REVIEWS, 3..5)
            };

            let days_ago: i64 = rng.random_range(0..365);

            reviews.push(Review {
                id: format!("review_{}_{}", business_id, i),
                text: pool[rng.random_range(0..pool.len())].to_string(),
                rating: Some(f64::from(rng.random_range(rating_range))),
                user: Some(format!("User_{}", rng.random_range(1000..10000))),
                user_photo: None,
                likes_count: rng.random_range(0..50),
                created_at: Some(now - Duration::days(days_ago)),
                url: None,
                source: SourceId::Mock,
            });
        }

        Ok(reviews)
    }

    async fn categories(&self) -> Result<Vec<Category>, AppError> {
        let mut names: Vec<&str> = TEMPLATES
            .iter()
            .flat_map(|(_, categories, _, _)| categories.iter().copied())
            .collect();
        names.sort_unstable();
        names.dedup();

        Ok(names.into_iter().map(Category::named).collect())
    }

    async fn probe(&self) -> Result<usize, AppError> {
        let query = SearchQuery::new("New York").with_limit(2);
        let results = self.search(&query).await?;
        Ok(results.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_respects_limit() {
        let source = MockSource::new();
        let query = SearchQuery::new("New York").with_limit(5);

        let results = source.search(&query).await.unwrap();

        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|b| b.source == SourceId::Mock));
    }

    #[tokio::test]
    async fn test_search_is_deterministic() {
        let source = MockSource::new();
        let query = SearchQuery::new("Chicago").with_limit(8);

        let first = source.search(&query).await.unwrap();
        let second = source.search(&query).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_search_filters_by_query() {
        let source = MockSource::new();
        let query = SearchQuery::new("New York")
            .with_limit(20)
            .with_query(Some("pizza".to_string()));

        let results = source.search(&query).await.unwrap();

        assert!(!results.is_empty());
        assert!(results
            .iter()
            .all(|b| b.name.to_lowercase().contains("pizza")));
    }

    #[tokio::test]
    async fn test_search_filters_by_category() {
        let source = MockSource::new();
        let query = SearchQuery::new("New York")
            .with_limit(20)
            .with_category(Some("coffee".to_string()));

        let results = source.search(&query).await.unwrap();

        assert!(!results.is_empty());
        for business in &results {
            assert!(business
                .categories
                .iter()
                .any(|c| c.name.to_lowercase().contains("coffee")));
        }
    }

    #[tokio::test]
    async fn test_details_match_generated_id() {
        let source = MockSource::new();

        let details = source.details("mock_3").await.unwrap().unwrap();

        assert_eq!(details.summary.id, "mock_3");
        assert!(details.website.is_some());
        assert_eq!(details.hours.len(), 7);
        assert_eq!(details.photos.len(), 5);
    }

    #[tokio::test]
    async fn test_details_are_deterministic() {
        let source = MockSource::new();

        let first = source.details("mock_5").await.unwrap().unwrap();
        let second = source.details("mock_5").await.unwrap().unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_details_for_foreign_id_is_none() {
        let source = MockSource::new();
        assert!(source.details("fsq_abc").await.unwrap().is_none());
        assert!(source.details("mock_notanumber").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reviews_have_ratings_in_range() {
        let source = MockSource::new();

        let reviews = source.reviews("mock_1", 25).await.unwrap();

        assert_eq!(reviews.len(), 25);
        for review in &reviews {
            let rating = review.rating.unwrap();
            assert!((1.0..=5.0).contains(&rating));
            assert!(!review.text.is_empty());
        }
    }

    #[tokio::test]
    async fn test_categories_are_deduplicated() {
        let source = MockSource::new();

        let categories = source.categories().await.unwrap();
        let mut names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
        let before = names.len();
        names.dedup();

        assert_eq!(before, names.len());
        assert!(categories.iter().any(|c| c.name == "Coffee Shop"));
    }

    #[tokio::test]
    async fn test_probe_always_succeeds() {
        let source = MockSource::new();
        assert_eq!(source.probe().await.unwrap(), 2);
    }

    #[test]
    fn test_extract_city() {
        assert_eq!(MockSource::extract_city("downtown Chicago"), "Chicago");
        assert_eq!(MockSource::extract_city("TOKYO"), "Tokyo");
        assert_eq!(MockSource::extract_city("Nowhere"), "New York");
    }
}
