//! Repository for the `tasks` table.

use kanban_core::board::DEFAULT_TASK_COLOR;
use kanban_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::task::{CreateTask, Task, UpdateTask};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, color, content, story_point, start_time, end_time, \
    executor_id, column_id, child_id, created_at, updated_at";

/// Provides chain-aware CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task at the given column with a null `child_id`.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        column_id: DbId,
        input: &CreateTask,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks
                (title, color, content, story_point, start_time, end_time, executor_id, column_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(&input.title)
            .bind(input.color.as_deref().unwrap_or(DEFAULT_TASK_COLOR))
            .bind(&input.content)
            .bind(input.story_point)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.executor_id)
            .bind(column_id)
            .fetch_one(executor)
            .await
    }

    /// Find a task by its ID.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// All tasks of a column in storage order.
    pub async fn list_by_column<'e, E: PgExecutor<'e>>(
        executor: E,
        column_id: DbId,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE column_id = $1 ORDER BY created_at, id");
        sqlx::query_as::<_, Task>(&query)
            .bind(column_id)
            .fetch_all(executor)
            .await
    }

    /// All tasks of every column of a project, for building the board in one
    /// round trip.
    pub async fn list_by_project<'e, E: PgExecutor<'e>>(
        executor: E,
        project_id: DbId,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks t
             JOIN columns c ON c.id = t.column_id
             WHERE c.project_id = $1
             ORDER BY t.created_at, t.id",
            prefixed("t")
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(executor)
            .await
    }

    /// The task of `column_id` with a null `child_id`, skipping `exclude`.
    pub async fn find_tail<'e, E: PgExecutor<'e>>(
        executor: E,
        column_id: DbId,
        exclude: Option<DbId>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE column_id = $1 AND child_id IS NULL
               AND ($2::uuid IS NULL OR id <> $2)
             LIMIT 1"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(column_id)
            .bind(exclude)
            .fetch_optional(executor)
            .await
    }

    /// The task of `column_id` that points at `id`.
    pub async fn find_predecessor<'e, E: PgExecutor<'e>>(
        executor: E,
        column_id: DbId,
        id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM tasks WHERE column_id = $1 AND child_id = $2 LIMIT 1");
        sqlx::query_as::<_, Task>(&query)
            .bind(column_id)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Rewrite the `child_id` pointer. Returns `true` if a row was updated.
    pub async fn set_child<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        child_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE tasks SET child_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(child_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a task to another column, leaving its pointer as is.
    pub async fn set_column<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        column_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE tasks SET column_id = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(column_id)
                .execute(executor)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Update the plain fields of a task.
    ///
    /// `None` keeps the stored value. For nullable fields `Some(None)` clears
    /// the column. Position fields are left to the chain manager.
    pub async fn update_fields<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                title = COALESCE($2, title),
                color = COALESCE($3, color),
                content = CASE WHEN $4 THEN $5 ELSE content END,
                story_point = COALESCE($6, story_point),
                start_time = CASE WHEN $7 THEN $8 ELSE start_time END,
                end_time = CASE WHEN $9 THEN $10 ELSE end_time END,
                executor_id = CASE WHEN $11 THEN $12 ELSE executor_id END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.color)
            .bind(input.content.is_some())
            .bind(input.content.clone().flatten())
            .bind(input.story_point)
            .bind(input.start_time.is_some())
            .bind(input.start_time.flatten())
            .bind(input.end_time.is_some())
            .bind(input.end_time.flatten())
            .bind(input.executor_id.is_some())
            .bind(input.executor_id.flatten())
            .fetch_optional(executor)
            .await
    }

    /// Delete a task by ID. Returns `true` if a row was removed.
    pub async fn delete<'e, E: PgExecutor<'e>>(executor: E, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// The column list qualified with a table alias.
fn prefixed(alias: &str) -> String {
    COLUMNS
        .split(", ")
        .map(|col| format!("{alias}.{}", col.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
