//! Repository for the `columns` table.
//!
//! Methods take any PostgreSQL executor so the same queries run against the
//! pool for reads and against a locked transaction for chain surgery.

use kanban_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::column::{Column, CreateColumn, UpdateColumn};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, project_id, child_id, wip_limit, created_at, updated_at";

/// Provides chain-aware CRUD operations for columns.
pub struct ColumnRepo;

impl ColumnRepo {
    /// Insert a new column with a null `child_id`, returning the created row.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        project_id: DbId,
        input: &CreateColumn,
    ) -> Result<Column, sqlx::Error> {
        let query = format!(
            "INSERT INTO columns (title, project_id, wip_limit)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Column>(&query)
            .bind(&input.title)
            .bind(project_id)
            .bind(input.wip_limit)
            .fetch_one(executor)
            .await
    }

    /// Find a column by its ID.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Column>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM columns WHERE id = $1");
        sqlx::query_as::<_, Column>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// All columns of a project in storage order. Chain order is applied by
    /// the caller.
    pub async fn list_by_project<'e, E: PgExecutor<'e>>(
        executor: E,
        project_id: DbId,
    ) -> Result<Vec<Column>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM columns WHERE project_id = $1 ORDER BY created_at, id");
        sqlx::query_as::<_, Column>(&query)
            .bind(project_id)
            .fetch_all(executor)
            .await
    }

    /// The column of `project_id` with a null `child_id`, skipping `exclude`.
    pub async fn find_tail<'e, E: PgExecutor<'e>>(
        executor: E,
        project_id: DbId,
        exclude: Option<DbId>,
    ) -> Result<Option<Column>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM columns
             WHERE project_id = $1 AND child_id IS NULL
               AND ($2::uuid IS NULL OR id <> $2)
             LIMIT 1"
        );
        sqlx::query_as::<_, Column>(&query)
            .bind(project_id)
            .bind(exclude)
            .fetch_optional(executor)
            .await
    }

    /// The column of `project_id` that points at `id`.
    pub async fn find_predecessor<'e, E: PgExecutor<'e>>(
        executor: E,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Column>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM columns WHERE project_id = $1 AND child_id = $2 LIMIT 1"
        );
        sqlx::query_as::<_, Column>(&query)
            .bind(project_id)
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
        let result =
            sqlx::query("UPDATE columns SET child_id = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(child_id)
                .execute(executor)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Update the plain fields of a column. Absent fields are left alone and
    /// an explicit `null` WIP limit clears it; `child_id` is left to the
    /// chain manager.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_fields<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        input: &UpdateColumn,
    ) -> Result<Option<Column>, sqlx::Error> {
        let query = format!(
            "UPDATE columns SET
                title = COALESCE($2, title),
                wip_limit = CASE WHEN $3 THEN $4 ELSE wip_limit END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Column>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.wip_limit.is_some())
            .bind(input.wip_limit.flatten())
            .fetch_optional(executor)
            .await
    }

    /// Delete a column by ID. Its tasks go with it. Returns `true` if a row
    /// was removed.
    pub async fn delete<'e, E: PgExecutor<'e>>(executor: E, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM columns WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
