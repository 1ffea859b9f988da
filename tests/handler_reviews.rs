mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use insighthub::api::handlers::business_reviews_handler;

fn reviews_router(state: insighthub::AppState) -> Router {
    Router::new()
        .route(
            "/api/v1/businesses/{id}/reviews",
            get(business_reviews_handler),
        )
        .with_state(state)
}

#[tokio::test]
async fn test_reviews_default_limit() {
    let (state, _dir) = common::create_test_state();
    let server = TestServer::new(reviews_router(state)).unwrap();

    let response = server.get("/api/v1/businesses/mock_1/reviews").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["success"], true);
    assert_eq!(json["business_id"], "mock_1");
    assert_eq!(json["source"], "mock");
    assert_eq!(json["count"], 20);
    assert_eq!(json["reviews"].as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn test_reviews_respect_limit_param() {
    let (state, _dir) = common::create_test_state();
    let server = TestServer::new(reviews_router(state)).unwrap();

    let response = server
        .get("/api/v1/businesses/mock_1/reviews")
        .add_query_param("limit", "3")
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["count"], 3);
}

#[tokio::test]
async fn test_reviews_limit_clamped_to_fifty() {
    let (state, _dir) = common::create_test_state();
    let server = TestServer::new(reviews_router(state)).unwrap();

    let response = server
        .get("/api/v1/businesses/mock_1/reviews")
        .add_query_param("limit", "500")
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["count"], 50);
}

#[tokio::test]
async fn test_reviews_fields() {
    let (state, _dir) = common::create_test_state();
    let server = TestServer::new(reviews_router(state)).unwrap();

    let response = server
        .get("/api/v1/businesses/mock_1/reviews")
        .add_query_param("limit", "5")
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    for review in json["reviews"].as_array().unwrap() {
        assert!(review["id"].as_str().unwrap().starts_with("review_mock_1"));
        assert!(!review["text"].as_str().unwrap().is_empty());
        let rating = review["rating"].as_f64().unwrap();
        assert!((1.0..=5.0).contains(&rating));
        assert_eq!(review["source"], "mock");
    }
}

#[tokio::test]
async fn test_reviews_for_foreign_id_empty() {
    let (state, _dir) = common::create_test_state();
    let server = TestServer::new(reviews_router(state)).unwrap();

    let response = server
        .get("/api/v1/businesses/fsq_xyz/reviews")
        .add_query_param("source", "mock")
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["count"], 0);
}
