//! Column operations.

use std::collections::HashMap;

use kanban_core::authorization::{authorize, Actor, Permission};
use kanban_core::chain::{order_chain, ChainManager};
use kanban_core::error::CoreError;
use kanban_core::types::DbId;
use kanban_db::chain::{ColumnChain, TaskChain};
use kanban_db::models::column::{Column, ColumnWithTasks, CreateColumn, UpdateColumn};
use kanban_db::models::task::Task;
use kanban_db::repositories::{ColumnRepo, TaskRepo};
use kanban_db::{lock_containers, store_error, Container};

use super::{settled, task_views, validate_input, KanbanService};

impl KanbanService {
    /// The project board: columns in chain order, each with its ordered tasks.
    pub async fn list_columns(
        &self,
        actor: &Actor,
        project_id: DbId,
    ) -> Result<Vec<ColumnWithTasks>, CoreError> {
        authorize(actor, Permission::GetColumn)?;
        self.check_member(actor, project_id).await?;

        let mut conn = self.pool.acquire().await.map_err(store_error)?;
        let columns =
            ChainManager::list_ordered(&mut ColumnChain::new(&mut conn), project_id).await?;
        // One query for the whole board; each column's tasks are ordered below.
        let tasks = TaskRepo::list_by_project(&mut *conn, project_id)
            .await
            .map_err(store_error)?;

        let mut by_column: HashMap<DbId, Vec<Task>> = HashMap::new();
        for task in tasks {
            by_column.entry(task.column_id).or_default().push(task);
        }

        Ok(settled("column", project_id, columns)
            .into_iter()
            .map(|column| {
                let tasks = by_column.remove(&column.id).unwrap_or_default();
                ColumnWithTasks {
                    tasks: task_views(column.id, order_chain(tasks)),
                    column,
                }
            })
            .collect())
    }

    /// One column with its ordered tasks.
    pub async fn get_column(
        &self,
        actor: &Actor,
        column_id: DbId,
    ) -> Result<ColumnWithTasks, CoreError> {
        authorize(actor, Permission::GetColumn)?;
        let column = self.load_column(column_id).await?;
        self.check_member(actor, column.project_id).await?;

        let mut conn = self.pool.acquire().await.map_err(store_error)?;
        let tasks = ChainManager::list_ordered(&mut TaskChain::new(&mut conn), column_id).await?;
        Ok(ColumnWithTasks {
            tasks: task_views(column_id, tasks),
            column,
        })
    }

    /// Append a new column at the end of the project board.
    pub async fn create_column(
        &self,
        actor: &Actor,
        project_id: DbId,
        input: CreateColumn,
    ) -> Result<Column, CoreError> {
        authorize(actor, Permission::CreateColumn)?;
        validate_input(&input)?;
        self.check_member(actor, project_id).await?;

        let column = self
            .retry_transient("create_column", || {
                self.create_column_attempt(project_id, input.clone())
            })
            .await?;

        tracing::info!(
            column_id = %column.id,
            project_id = %project_id,
            actor_id = %actor.id,
            "Column created",
        );
        Ok(column)
    }

    async fn create_column_attempt(
        &self,
        project_id: DbId,
        input: CreateColumn,
    ) -> Result<Column, CoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        lock_containers(&mut tx, &[Container::Project(project_id)]).await?;
        let column =
            ChainManager::append_tail(&mut ColumnChain::new(&mut tx), project_id, input).await?;
        tx.commit().await.map_err(store_error)?;
        Ok(column)
    }

    /// Rename, change the WIP limit of, or move a column.
    ///
    /// A `child_id` different from the current one repositions the column
    /// directly before that sibling, or at the end for `null`.
    pub async fn update_column(
        &self,
        actor: &Actor,
        column_id: DbId,
        input: UpdateColumn,
    ) -> Result<Column, CoreError> {
        authorize(actor, Permission::UpdateColumn)?;
        validate_input(&input)?;
        if input.wip_limit_invalid() {
            return Err(CoreError::Validation(
                "wip_limit: must be at least 1".to_string(),
            ));
        }
        let column = self.load_column(column_id).await?;
        self.check_member(actor, column.project_id).await?;

        let column = self
            .retry_transient("update_column", || {
                self.update_column_attempt(column.project_id, column_id, &input)
            })
            .await?;

        tracing::info!(column_id = %column_id, actor_id = %actor.id, "Column updated");
        Ok(column)
    }

    async fn update_column_attempt(
        &self,
        project_id: DbId,
        column_id: DbId,
        input: &UpdateColumn,
    ) -> Result<Column, CoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        lock_containers(&mut tx, &[Container::Project(project_id)]).await?;

        let column = ColumnRepo::find_by_id(&mut *tx, column_id)
            .await
            .map_err(store_error)?
            .ok_or(CoreError::NotFound {
                entity: "Column",
                id: column_id,
            })?;

        if let Some(new_next) = input.child_id {
            ChainManager::reposition(
                &mut ColumnChain::new(&mut tx),
                &column,
                new_next,
                move |other: &Column| other.project_id == project_id,
            )
            .await?;
        }

        let column = ColumnRepo::update_fields(&mut *tx, column_id, input)
            .await
            .map_err(store_error)?
            .ok_or(CoreError::NotFound {
                entity: "Column",
                id: column_id,
            })?;
        tx.commit().await.map_err(store_error)?;
        Ok(column)
    }

    /// Delete a column and its tasks, closing the gap in the board.
    ///
    /// The tasks go through the `ON DELETE CASCADE` on `tasks.column_id`.
    /// Earlier deployments used a plain foreign key there, which rejected
    /// deleting a column that still had tasks.
    pub async fn delete_column(&self, actor: &Actor, column_id: DbId) -> Result<(), CoreError> {
        authorize(actor, Permission::DeleteColumn)?;
        let column = self.load_column(column_id).await?;
        self.check_member(actor, column.project_id).await?;

        self.retry_transient("delete_column", || {
            self.delete_column_attempt(column.project_id, column_id)
        })
        .await?;

        tracing::info!(column_id = %column_id, actor_id = %actor.id, "Column deleted");
        Ok(())
    }

    async fn delete_column_attempt(&self, project_id: DbId, column_id: DbId) -> Result<(), CoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        lock_containers(
            &mut tx,
            &[Container::Project(project_id), Container::Column(column_id)],
        )
        .await?;

        let column = ColumnRepo::find_by_id(&mut *tx, column_id)
            .await
            .map_err(store_error)?
            .ok_or(CoreError::NotFound {
                entity: "Column",
                id: column_id,
            })?;
        ChainManager::remove(&mut ColumnChain::new(&mut tx), &column).await?;
        tx.commit().await.map_err(store_error)?;
        Ok(())
    }
}
