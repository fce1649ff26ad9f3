//! Column model and DTOs.

use kanban_core::chain::ChainLink;
use kanban_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::task::TaskView;

/// A row from the `columns` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Column {
    pub id: DbId,
    pub title: String,
    pub project_id: DbId,
    pub child_id: Option<DbId>,
    pub wip_limit: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ChainLink for Column {
    fn id(&self) -> DbId {
        self.id
    }

    fn child_id(&self) -> Option<DbId> {
        self.child_id
    }

    fn scope_id(&self) -> DbId {
        self.project_id
    }
}

/// A column with its tasks in chain order.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnWithTasks {
    #[serde(flatten)]
    pub column: Column,
    pub tasks: Vec<TaskView>,
}

/// DTO for creating a column. The project comes from the request scope.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateColumn {
    #[validate(length(min = 1, max = 64))]
    pub title: String,
    #[validate(range(min = 1))]
    pub wip_limit: Option<i32>,
}

/// DTO for updating a column.
///
/// `child_id` moves the column: absent leaves the position alone, `null`
/// moves it to the end, an id places it directly before that column. An
/// explicit `null` for `wip_limit` removes the limit.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateColumn {
    #[validate(length(min = 1, max = 64))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub wip_limit: Option<Option<i32>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub child_id: Option<Option<DbId>>,
}

impl UpdateColumn {
    /// The derive cannot reach inside the nested option.
    pub fn wip_limit_invalid(&self) -> bool {
        matches!(self.wip_limit, Some(Some(limit)) if limit < 1)
    }
}
