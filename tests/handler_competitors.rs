mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use insighthub::api::handlers::competitors_handler;

fn competitors_router(state: insighthub::AppState) -> Router {
    Router::new()
        .route("/api/v1/competitors", get(competitors_handler))
        .with_state(state)
}

#[tokio::test]
async fn test_competitors_requires_business_name() {
    let (state, _dir) = common::create_test_state();
    let server = TestServer::new(competitors_router(state)).unwrap();

    let response = server.get("/api/v1/competitors").await;

    response.assert_status_bad_request();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["details"]["parameter"], "business");
}

#[tokio::test]
async fn test_competitors_empty_business_name_rejected() {
    let (state, _dir) = common::create_test_state();
    let server = TestServer::new(competitors_router(state)).unwrap();

    let response = server
        .get("/api/v1/competitors")
        .add_query_param("business", "")
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_competitors_excludes_target() {
    let (state, _dir) = common::create_test_state();
    let server = TestServer::new(competitors_router(state)).unwrap();

    // "Pizza Palace" is one of the generated mock businesses.
    let response = server
        .get("/api/v1/competitors")
        .add_query_param("business", "Pizza Palace")
        .add_query_param("location", "New York")
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["success"], true);
    assert_eq!(json["target_business"], "Pizza Palace");

    for competitor in json["competitors"].as_array().unwrap() {
        let name = competitor["name"].as_str().unwrap().to_lowercase();
        assert!(!name.contains("pizza palace"));
    }
}

#[tokio::test]
async fn test_competitors_analysis_block() {
    let (state, _dir) = common::create_test_state();
    let server = TestServer::new(competitors_router(state)).unwrap();

    let response = server
        .get("/api/v1/competitors")
        .add_query_param("business", "Nonexistent Bistro")
        .add_query_param("limit", "4")
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    let analysis = &json["analysis"];

    let count = json["competitors_count"].as_u64().unwrap();
    assert!(count <= 4);
    assert_eq!(analysis["market_saturation"].as_u64().unwrap(), count);

    // Mock ratings sit on the 0-5 scale already.
    let avg = analysis["average_competitor_rating"].as_f64().unwrap();
    assert!((0.0..=5.0).contains(&avg));
    let weighted = analysis["weighted_competitor_rating"].as_f64().unwrap();
    assert!((0.0..=5.0).contains(&weighted));
    assert!(analysis["average_competitor_reviews"].as_f64().unwrap() >= 0.0);
}
