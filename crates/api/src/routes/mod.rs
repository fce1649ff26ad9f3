pub mod columns;
pub mod health;
pub mod stats;
pub mod tags;
pub mod tasks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /columns/list?project_id=                        board (columns with tasks)
/// /columns/new?project_id=                         create column (POST)
/// /columns/{column_id}                             get, update, delete
///
/// /tasks/list?column_id=                           tasks of a column
/// /tasks/new?column_id=                            create task (POST)
/// /tasks/{task_id}                                 get, update, delete
/// /tasks/{task_id}/tags/{tag_id}                   set (POST), unset (DELETE)
///
/// /tags/list?project_id=                           project tags
/// /tags/new?project_id=                            create tag (POST)
/// /tags/{tag_id}                                   delete
///
/// /stats/tag?project_id=                           tasks per tag
/// /stats/version?details=                          service version (public)
/// /stats/ping                                      liveness (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/columns", columns::router())
        .nest("/tasks", tasks::router())
        .nest("/tags", tags::router())
        .nest("/stats", stats::router())
}
