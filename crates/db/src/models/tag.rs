//! Tag and task-tag models and DTOs.

use kanban_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `tags` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tag {
    pub id: DbId,
    pub title: String,
    pub project_id: DbId,
    pub created_at: Timestamp,
}

/// A row from the `task_tags` junction table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskTag {
    pub id: DbId,
    pub task_id: DbId,
    pub tag_id: DbId,
}

/// Number of tasks carrying a tag.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TagStat {
    pub title: String,
    pub count: i64,
}

/// DTO for creating a tag. The project comes from the request scope.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTag {
    #[validate(length(min = 1, max = 32))]
    pub title: String,
}
