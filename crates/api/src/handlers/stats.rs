//! Handlers for `/stats`: tag usage, service version and liveness.

use axum::extract::{Query, State};
use axum::Json;
use kanban_db::models::tag::TagStat;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::{ProjectQuery, VersionParams};
use crate::response::{data, DataResponse};
use crate::state::AppState;

/// Service version, optionally with build metadata.
#[derive(Debug, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl VersionInfo {
    /// Read `BUILD` and `BRANCH` from the environment when `details` is set.
    fn collect(details: bool) -> Self {
        let (build, branch) = if details {
            (
                Some(std::env::var("BUILD").unwrap_or_else(|_| "unknown".into())),
                Some(std::env::var("BRANCH").unwrap_or_else(|_| "unknown".into())),
            )
        } else {
            (None, None)
        };
        Self {
            version: env!("CARGO_PKG_VERSION"),
            build,
            branch,
        }
    }
}

/// GET /api/v1/stats/tag?project_id=
pub async fn tag_stats(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(params): Query<ProjectQuery>,
) -> AppResult<Json<DataResponse<Vec<TagStat>>>> {
    let stats = state.kanban.tag_stats(&actor, params.project_id).await?;
    Ok(data(stats))
}

/// GET /api/v1/stats/version?details=
pub async fn version(Query(params): Query<VersionParams>) -> Json<DataResponse<VersionInfo>> {
    data(VersionInfo::collect(params.details))
}

/// GET /api/v1/stats/ping
pub async fn ping() -> Json<DataResponse<&'static str>> {
    data("pong")
}
