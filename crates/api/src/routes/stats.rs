//! Route definitions for `/stats`.

use axum::routing::get;
use axum::Router;

use crate::handlers::stats;
use crate::state::AppState;

/// Routes mounted at `/stats`.
///
/// ```text
/// GET /tag?project_id=     -> tag_stats
/// GET /version?details=    -> version
/// GET /ping                -> ping
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tag", get(stats::tag_stats))
        .route("/version", get(stats::version))
        .route("/ping", get(stats::ping))
}
