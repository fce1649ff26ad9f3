//! Route definitions for the `/tasks` resource, including tag associations.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{tags, tasks};
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /list?column_id=             -> list
/// POST   /new?column_id=              -> create
/// GET    /{task_id}                   -> get_by_id
/// PUT    /{task_id}                   -> update
/// DELETE /{task_id}                   -> delete
/// POST   /{task_id}/tags/{tag_id}     -> set tag
/// DELETE /{task_id}/tags/{tag_id}     -> unset tag
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", get(tasks::list))
        .route("/new", post(tasks::create))
        .route(
            "/{task_id}",
            get(tasks::get_by_id)
                .put(tasks::update)
                .delete(tasks::delete),
        )
        .route("/{task_id}/tags/{tag_id}", post(tags::set).delete(tags::unset))
}
