//! Handlers for the `/tasks` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kanban_core::types::DbId;
use kanban_db::models::task::{CreateTask, TaskView, UpdateTask};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::ColumnQuery;
use crate::response::{created, data, DataResponse};
use crate::state::AppState;

/// GET /api/v1/tasks/list?column_id=
pub async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(params): Query<ColumnQuery>,
) -> AppResult<Json<DataResponse<Vec<TaskView>>>> {
    let tasks = state.kanban.list_tasks(&actor, params.column_id).await?;
    Ok(data(tasks))
}

/// POST /api/v1/tasks/new?column_id=
pub async fn create(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(params): Query<ColumnQuery>,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<DataResponse<TaskView>>)> {
    let task = state
        .kanban
        .create_task(&actor, params.column_id, input)
        .await?;
    Ok(created(task))
}

/// GET /api/v1/tasks/{task_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(task_id): Path<DbId>,
) -> AppResult<Json<DataResponse<TaskView>>> {
    let task = state.kanban.get_task(&actor, task_id).await?;
    Ok(data(task))
}

/// PUT /api/v1/tasks/{task_id}
pub async fn update(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(task_id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<StatusCode> {
    state.kanban.update_task(&actor, task_id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/tasks/{task_id}
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(task_id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.kanban.delete_task(&actor, task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
