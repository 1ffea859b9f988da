mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use insighthub::api::handlers::search_handler;

fn search_router(state: insighthub::AppState) -> Router {
    Router::new()
        .route("/api/v1/search", get(search_handler))
        .with_state(state)
}

#[tokio::test]
async fn test_search_returns_envelope() {
    let (state, _dir) = common::create_test_state();
    let server = TestServer::new(search_router(state)).unwrap();

    let response = server
        .get("/api/v1/search")
        .add_query_param("location", "New York")
        .add_query_param("limit", "5")
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["success"], true);
    assert_eq!(json["source"], "mock");
    assert_eq!(json["location"], "New York");
    assert_eq!(json["count"], 5);
    assert_eq!(json["businesses"].as_array().unwrap().len(), 5);
    assert_eq!(json["cache_info"]["cached"], false);
    assert_eq!(json["cache_info"]["source"], "generated");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_search_uses_default_location() {
    let (state, _dir) = common::create_test_state();
    let server = TestServer::new(search_router(state)).unwrap();

    let response = server.get("/api/v1/search").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["location"], "New York");
}

#[tokio::test]
async fn test_search_default_limit_is_ten() {
    let (state, _dir) = common::create_test_state();
    let server = TestServer::new(search_router(state)).unwrap();

    let response = server
        .get("/api/v1/search")
        .add_query_param("location", "Chicago")
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["count"], 10);
}

#[tokio::test]
async fn test_search_filters_by_query() {
    let (state, _dir) = common::create_test_state();
    let server = TestServer::new(search_router(state)).unwrap();

    let response = server
        .get("/api/v1/search")
        .add_query_param("location", "New York")
        .add_query_param("query", "pizza")
        .add_query_param("limit", "20")
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["query"], "pizza");

    for business in json["businesses"].as_array().unwrap() {
        let name = business["name"].as_str().unwrap().to_lowercase();
        assert!(name.contains("pizza"));
    }
}

#[tokio::test]
async fn test_search_unknown_source_is_bad_request() {
    let (state, _dir) = common::create_test_state();
    let server = TestServer::new(search_router(state)).unwrap();

    let response = server
        .get("/api/v1/search")
        .add_query_param("source", "tripadvisor")
        .await;

    response.assert_status_bad_request();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_search_unregistered_source_is_unavailable() {
    let (state, _dir) = common::create_test_state();
    let server = TestServer::new(search_router(state)).unwrap();

    let response = server
        .get("/api/v1/search")
        .add_query_param("source", "yelp")
        .await;

    response.assert_status_service_unavailable();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "source_unavailable");
}

#[tokio::test]
async fn test_search_results_carry_mock_source_tag() {
    let (state, _dir) = common::create_test_state();
    let server = TestServer::new(search_router(state)).unwrap();

    let response = server
        .get("/api/v1/search")
        .add_query_param("source", "mock")
        .add_query_param("limit", "3")
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    for business in json["businesses"].as_array().unwrap() {
        assert_eq!(business["source"], "mock");
        assert!(business["id"].as_str().unwrap().starts_with("mock_"));
    }
}
