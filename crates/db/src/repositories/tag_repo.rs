//! Repository for the `tags` and `task_tags` tables.

use kanban_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::tag::{CreateTag, Tag, TagStat, TaskTag};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, project_id, created_at";

/// Provides tag lifecycle and task-tag association queries.
pub struct TagRepo;

impl TagRepo {
    /// Insert a new tag. A duplicate title within the project violates
    /// `uq_tags_project_title`.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        project_id: DbId,
        input: &CreateTag,
    ) -> Result<Tag, sqlx::Error> {
        let query = format!(
            "INSERT INTO tags (title, project_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(&input.title)
            .bind(project_id)
            .fetch_one(executor)
            .await
    }

    /// Find a tag by its ID.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags WHERE id = $1");
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a tag by title within a project.
    pub async fn find_by_title<'e, E: PgExecutor<'e>>(
        executor: E,
        project_id: DbId,
        title: &str,
    ) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags WHERE project_id = $1 AND title = $2");
        sqlx::query_as::<_, Tag>(&query)
            .bind(project_id)
            .bind(title)
            .fetch_optional(executor)
            .await
    }

    /// All tags of a project, alphabetically.
    pub async fn list_by_project<'e, E: PgExecutor<'e>>(
        executor: E,
        project_id: DbId,
    ) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags WHERE project_id = $1 ORDER BY title");
        sqlx::query_as::<_, Tag>(&query)
            .bind(project_id)
            .fetch_all(executor)
            .await
    }

    /// Delete a tag and, through the foreign key, its associations.
    pub async fn delete<'e, E: PgExecutor<'e>>(executor: E, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether `task_id` already carries `tag_id`.
    pub async fn has_link<'e, E: PgExecutor<'e>>(
        executor: E,
        task_id: DbId,
        tag_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM task_tags WHERE task_id = $1 AND tag_id = $2)",
        )
        .bind(task_id)
        .bind(tag_id)
        .fetch_one(executor)
        .await
    }

    /// Attach a tag to a task.
    pub async fn link<'e, E: PgExecutor<'e>>(
        executor: E,
        task_id: DbId,
        tag_id: DbId,
    ) -> Result<TaskTag, sqlx::Error> {
        sqlx::query_as::<_, TaskTag>(
            "INSERT INTO task_tags (task_id, tag_id) VALUES ($1, $2) RETURNING id, task_id, tag_id",
        )
        .bind(task_id)
        .bind(tag_id)
        .fetch_one(executor)
        .await
    }

    /// Detach a tag from a task. Returns `true` if an association was removed.
    pub async fn unlink<'e, E: PgExecutor<'e>>(
        executor: E,
        task_id: DbId,
        tag_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_tags WHERE task_id = $1 AND tag_id = $2")
            .bind(task_id)
            .bind(tag_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of tasks carrying each tag of a project, including unused tags.
    pub async fn stats<'e, E: PgExecutor<'e>>(
        executor: E,
        project_id: DbId,
    ) -> Result<Vec<TagStat>, sqlx::Error> {
        sqlx::query_as::<_, TagStat>(
            "SELECT g.title, COUNT(tt.id) AS count
             FROM tags g
             LEFT JOIN task_tags tt ON tt.tag_id = g.id
             WHERE g.project_id = $1
             GROUP BY g.id, g.title
             ORDER BY g.title",
        )
        .bind(project_id)
        .fetch_all(executor)
        .await
    }
}
