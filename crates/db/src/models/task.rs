//! Task model and DTOs.

use kanban_core::board::TaskStatus;
use kanban_core::chain::ChainLink;
use kanban_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub title: String,
    pub color: String,
    pub content: Option<String>,
    pub story_point: i32,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub executor_id: Option<DbId>,
    pub column_id: DbId,
    pub child_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    pub fn status(&self) -> TaskStatus {
        TaskStatus::from_times(self.start_time, self.end_time)
    }
}

impl ChainLink for Task {
    fn id(&self) -> DbId {
        self.id
    }

    fn child_id(&self) -> Option<DbId> {
        self.child_id
    }

    fn scope_id(&self) -> DbId {
        self.column_id
    }
}

/// A task as returned to clients, with its derived status.
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub status: TaskStatus,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        let status = task.status();
        Self { task, status }
    }
}

/// DTO for creating a task. The column comes from the request scope.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTask {
    #[validate(length(min = 1, max = 64))]
    pub title: String,
    /// Defaults to `#8DA2DB` if omitted.
    pub color: Option<String>,
    #[validate(length(max = 10000))]
    pub content: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, max = 5000))]
    pub story_point: i32,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub executor_id: Option<DbId>,
}

/// DTO for updating a task.
///
/// `column_id` moves the task to another column. `child_id` follows the same
/// absent / `null` / id convention as columns. Nullable fields accept an
/// explicit `null` to clear them.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 64))]
    pub title: Option<String>,
    pub color: Option<String>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub content: Option<Option<String>>,
    #[validate(range(min = 0, max = 5000))]
    pub story_point: Option<i32>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub start_time: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub end_time: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub executor_id: Option<Option<DbId>>,
    pub column_id: Option<DbId>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub child_id: Option<Option<DbId>>,
}

impl UpdateTask {
    /// Content length is not covered by the derive because of the nested option.
    pub fn content_too_long(&self) -> bool {
        matches!(&self.content, Some(Some(c)) if c.chars().count() > kanban_core::board::MAX_CONTENT_LEN)
    }
}
