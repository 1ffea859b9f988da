mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use insighthub::api::handlers::health_handler;

#[tokio::test]
async fn test_health_reports_healthy() {
    let (state, _dir) = common::create_test_state();
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(state);

    let server = TestServer::new(app).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
    assert_eq!(json["checks"]["cache"]["status"], "ok");
    assert_eq!(json["checks"]["budget_ledger"]["status"], "ok");
    assert_eq!(json["checks"]["sources"]["status"], "ok");
    assert!(
        json["checks"]["sources"]["message"]
            .as_str()
            .unwrap()
            .contains("mock")
    );
}
