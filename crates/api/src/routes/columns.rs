//! Route definitions for the `/columns` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::columns;
use crate::state::AppState;

/// Routes mounted at `/columns`.
///
/// ```text
/// GET    /list?project_id=     -> list
/// POST   /new?project_id=      -> create
/// GET    /{column_id}          -> get_by_id
/// PUT    /{column_id}          -> update
/// DELETE /{column_id}          -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", get(columns::list))
        .route("/new", post(columns::create))
        .route(
            "/{column_id}",
            get(columns::get_by_id)
                .put(columns::update)
                .delete(columns::delete),
        )
}
