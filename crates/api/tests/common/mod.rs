#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use kanban_api::auth::jwt::{issue_token, JwtConfig};
use kanban_api::config::ServerConfig;
use kanban_api::kanban::KanbanService;
use kanban_api::router::build_app_router;
use kanban_api::state::AppState;
use kanban_core::authorization::{Actor, Permission, UserState};
use kanban_core::membership::MembershipOracle;
use kanban_core::types::DbId;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            token_ttl_mins: 15,
        },
        membership_url: "http://127.0.0.1:9".to_string(),
        membership_timeout_ms: 100,
        chain_retry_limit: 3,
    }
}

/// Membership fake: every user belongs to every project except `denied`.
#[derive(Default)]
pub struct TestMembership {
    pub denied: HashSet<DbId>,
}

impl TestMembership {
    pub fn denying(project_id: DbId) -> Self {
        Self {
            denied: HashSet::from([project_id]),
        }
    }
}

#[async_trait]
impl MembershipOracle for TestMembership {
    async fn is_member(&self, project_id: DbId, _user_id: DbId) -> bool {
        !self.denied.contains(&project_id)
    }
}

/// Build the full application router around `pool`, with every user a
/// member of every project.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, TestMembership::default())
}

/// Build the full application router with a custom membership fake.
pub fn build_test_app_with(pool: PgPool, membership: TestMembership) -> Router {
    let config = test_config();
    let kanban = KanbanService::new(pool.clone(), Arc::new(membership), config.chain_retry_limit);
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        kanban: Arc::new(kanban),
    };
    build_app_router(state, &config)
}

/// A pool that never connects, for requests rejected before any store access.
pub fn lazy_pool() -> PgPool {
    sqlx::postgres::PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(500))
        .connect_lazy("postgres://kanban@127.0.0.1:1/unreachable")
        .unwrap()
}

/// Bearer token for an actor with the given state and capabilities.
pub fn token(state: UserState, permissions: &[Permission]) -> String {
    let actor = Actor::new(Uuid::new_v4(), state, permissions.iter().copied());
    issue_token(&actor, &test_config().jwt).unwrap()
}

/// Bearer token for an active actor holding every capability.
pub fn admin_token() -> String {
    token(UserState::Active, &Permission::ALL)
}

/// Send a request through the router. `body` is sent as JSON when given.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

/// Read and parse a JSON response body.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
