//! `/health`, public stats endpoints and the shared middleware stack.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get};
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "../db/migrations")]
async fn health_reports_ok_with_reachable_database(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
}

#[tokio::test]
async fn health_check_reports_unreachable_database() {
    let app = common::build_test_app(common::lazy_pool());
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_test_app(common::lazy_pool());
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn request_id_is_assigned_or_echoed() {
    let app = common::build_test_app(common::lazy_pool());
    let response = get(app, "/api/v1/stats/ping").await;
    let assigned = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(assigned).is_ok());

    let app = common::build_test_app(common::lazy_pool());
    let request = Request::get("/api/v1/stats/ping")
        .header("x-request-id", "board-trace-1")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "board-trace-1");
}

#[tokio::test]
async fn board_frontend_passes_cors_preflight() {
    let app = common::build_test_app(common::lazy_pool());
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/columns/list")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "PUT")
        .header("Access-Control-Request-Headers", "authorization,content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:5173");
    assert!(headers["access-control-allow-methods"]
        .to_str()
        .unwrap()
        .contains("PUT"));
}

#[tokio::test]
async fn ping_and_version_are_public() {
    let app = common::build_test_app(common::lazy_pool());
    let json = body_json(get(app, "/api/v1/stats/ping").await).await;
    assert_eq!(json["data"], "pong");

    let app = common::build_test_app(common::lazy_pool());
    let json = body_json(get(app, "/api/v1/stats/version").await).await;
    assert!(json["data"]["version"].is_string());
    assert!(json["data"].get("build").is_none());

    let app = common::build_test_app(common::lazy_pool());
    let json = body_json(get(app, "/api/v1/stats/version?details=true").await).await;
    assert!(json["data"]["build"].is_string());
    assert!(json["data"]["branch"].is_string());
}
