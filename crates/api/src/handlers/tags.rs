//! Handlers for tags and task-tag associations.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kanban_core::types::DbId;
use kanban_db::models::tag::{CreateTag, Tag};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::ProjectQuery;
use crate::response::{created, data, DataResponse};
use crate::state::AppState;

/// GET /api/v1/tags/list?project_id=
pub async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(params): Query<ProjectQuery>,
) -> AppResult<Json<DataResponse<Vec<Tag>>>> {
    let tags = state.kanban.list_tags(&actor, params.project_id).await?;
    Ok(data(tags))
}

/// POST /api/v1/tags/new?project_id=
pub async fn create(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(params): Query<ProjectQuery>,
    Json(input): Json<CreateTag>,
) -> AppResult<(StatusCode, Json<DataResponse<Tag>>)> {
    let tag = state
        .kanban
        .create_tag(&actor, params.project_id, input)
        .await?;
    Ok(created(tag))
}

/// DELETE /api/v1/tags/{tag_id}
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(tag_id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.kanban.delete_tag(&actor, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/tasks/{task_id}/tags/{tag_id}
pub async fn set(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path((task_id, tag_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    state.kanban.set_tag(&actor, task_id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/tasks/{task_id}/tags/{tag_id}
pub async fn unset(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path((task_id, tag_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    state.kanban.unset_tag(&actor, task_id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
