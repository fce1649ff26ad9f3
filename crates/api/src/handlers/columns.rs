//! Handlers for the `/columns` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kanban_core::types::DbId;
use kanban_db::models::column::{Column, ColumnWithTasks, CreateColumn, UpdateColumn};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::ProjectQuery;
use crate::response::{created, data, DataResponse};
use crate::state::AppState;

/// GET /api/v1/columns/list?project_id=
pub async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(params): Query<ProjectQuery>,
) -> AppResult<Json<DataResponse<Vec<ColumnWithTasks>>>> {
    let board = state.kanban.list_columns(&actor, params.project_id).await?;
    Ok(data(board))
}

/// POST /api/v1/columns/new?project_id=
pub async fn create(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(params): Query<ProjectQuery>,
    Json(input): Json<CreateColumn>,
) -> AppResult<(StatusCode, Json<DataResponse<Column>>)> {
    let column = state
        .kanban
        .create_column(&actor, params.project_id, input)
        .await?;
    Ok(created(column))
}

/// GET /api/v1/columns/{column_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(column_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ColumnWithTasks>>> {
    let column = state.kanban.get_column(&actor, column_id).await?;
    Ok(data(column))
}

/// PUT /api/v1/columns/{column_id}
pub async fn update(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(column_id): Path<DbId>,
    Json(input): Json<UpdateColumn>,
) -> AppResult<StatusCode> {
    state.kanban.update_column(&actor, column_id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/columns/{column_id}
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(column_id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.kanban.delete_column(&actor, column_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
