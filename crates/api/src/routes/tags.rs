//! Route definitions for the `/tags` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::tags;
use crate::state::AppState;

/// Routes mounted at `/tags`.
///
/// ```text
/// GET    /list?project_id=     -> list
/// POST   /new?project_id=      -> create
/// DELETE /{tag_id}             -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", get(tags::list))
        .route("/new", post(tags::create))
        .route("/{tag_id}", delete(tags::delete))
}
