//! Task operations.

use kanban_core::authorization::{authorize, Actor, Permission};
use kanban_core::board::{validate_color, validate_time_range, MAX_CONTENT_LEN};
use kanban_core::chain::ChainManager;
use kanban_core::error::CoreError;
use kanban_core::types::DbId;
use kanban_db::chain::TaskChain;
use kanban_db::models::column::Column;
use kanban_db::models::task::{CreateTask, Task, TaskView, UpdateTask};
use kanban_db::repositories::{ColumnRepo, TaskRepo};
use kanban_db::{lock_containers, store_error, Container};

use super::{task_views, validate_input, KanbanService};

impl KanbanService {
    /// Load a task or fail with `NotFound`.
    pub(super) async fn load_task(&self, task_id: DbId) -> Result<Task, CoreError> {
        TaskRepo::find_by_id(&self.pool, task_id)
            .await
            .map_err(store_error)?
            .ok_or(CoreError::NotFound {
                entity: "Task",
                id: task_id,
            })
    }

    /// Tasks of a column in chain order.
    pub async fn list_tasks(
        &self,
        actor: &Actor,
        column_id: DbId,
    ) -> Result<Vec<TaskView>, CoreError> {
        authorize(actor, Permission::GetTask)?;
        let column = self.load_column(column_id).await?;
        self.check_member(actor, column.project_id).await?;

        let mut conn = self.pool.acquire().await.map_err(store_error)?;
        let tasks = ChainManager::list_ordered(&mut TaskChain::new(&mut conn), column_id).await?;
        Ok(task_views(column_id, tasks))
    }

    pub async fn get_task(&self, actor: &Actor, task_id: DbId) -> Result<TaskView, CoreError> {
        authorize(actor, Permission::GetTask)?;
        let task = self.load_task(task_id).await?;
        let column = self.load_column(task.column_id).await?;
        self.check_member(actor, column.project_id).await?;
        Ok(TaskView::from(task))
    }

    /// Append a new task at the bottom of a column.
    pub async fn create_task(
        &self,
        actor: &Actor,
        column_id: DbId,
        input: CreateTask,
    ) -> Result<TaskView, CoreError> {
        authorize(actor, Permission::CreateTask)?;
        validate_input(&input)?;
        if let Some(color) = &input.color {
            validate_color(color)?;
        }
        validate_time_range(input.start_time, input.end_time)?;

        let column = self.load_column(column_id).await?;
        self.check_member(actor, column.project_id).await?;

        let task = self
            .retry_transient("create_task", || {
                self.create_task_attempt(column_id, input.clone())
            })
            .await?;

        tracing::info!(
            task_id = %task.id,
            column_id = %column_id,
            actor_id = %actor.id,
            "Task created",
        );
        Ok(TaskView::from(task))
    }

    async fn create_task_attempt(&self, column_id: DbId, input: CreateTask) -> Result<Task, CoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        lock_containers(&mut tx, &[Container::Column(column_id)]).await?;
        locked_column(&mut tx, column_id).await?;

        let task = ChainManager::append_tail(&mut TaskChain::new(&mut tx), column_id, input).await?;
        tx.commit().await.map_err(store_error)?;
        Ok(task)
    }

    /// Edit a task's fields, reorder it within its column or move it to
    /// another column.
    ///
    /// When `column_id` names a different column the task becomes that
    /// column's tail, then moves before `child_id` if one is given. Otherwise
    /// a present `child_id` repositions it within its current column.
    pub async fn update_task(
        &self,
        actor: &Actor,
        task_id: DbId,
        input: UpdateTask,
    ) -> Result<TaskView, CoreError> {
        authorize(actor, Permission::UpdateTask)?;
        validate_input(&input)?;
        if input.content_too_long() {
            return Err(CoreError::Validation(format!(
                "content: must be at most {MAX_CONTENT_LEN} characters"
            )));
        }
        if let Some(color) = &input.color {
            validate_color(color)?;
        }

        let task = self
            .retry_transient("update_task", || {
                self.update_task_attempt(actor, task_id, &input)
            })
            .await?;

        tracing::info!(
            task_id = %task_id,
            column_id = %task.column_id,
            actor_id = %actor.id,
            "Task updated",
        );
        Ok(TaskView::from(task))
    }

    async fn update_task_attempt(
        &self,
        actor: &Actor,
        task_id: DbId,
        input: &UpdateTask,
    ) -> Result<Task, CoreError> {
        let task = self.load_task(task_id).await?;
        let source = self.load_column(task.column_id).await?;
        self.check_member(actor, source.project_id).await?;

        let destination = match input.column_id {
            Some(column_id) if column_id != task.column_id => {
                let destination = self.load_column(column_id).await?;
                if destination.project_id != source.project_id {
                    self.check_member(actor, destination.project_id).await?;
                }
                Some(destination.id)
            }
            _ => None,
        };

        let start_time = input.start_time.unwrap_or(task.start_time);
        let end_time = input.end_time.unwrap_or(task.end_time);
        validate_time_range(start_time, end_time)?;

        let mut containers = vec![Container::Column(task.column_id)];
        containers.extend(destination.map(Container::Column));

        let mut tx = self.pool.begin().await.map_err(store_error)?;
        lock_containers(&mut tx, &containers).await?;

        let current = locked_task(&mut tx, task.column_id, task_id).await?;
        match destination {
            Some(destination) => {
                locked_column(&mut tx, destination).await?;
                ChainManager::relocate(
                    &mut TaskChain::new(&mut tx),
                    &current,
                    destination,
                    input.child_id.flatten(),
                    move |other: &Task| other.column_id == destination,
                )
                .await?;
            }
            None => {
                if let Some(new_next) = input.child_id {
                    let column_id = current.column_id;
                    ChainManager::reposition(
                        &mut TaskChain::new(&mut tx),
                        &current,
                        new_next,
                        move |other: &Task| other.column_id == column_id,
                    )
                    .await?;
                }
            }
        }

        let task = TaskRepo::update_fields(&mut *tx, task_id, input)
            .await
            .map_err(store_error)?
            .ok_or(CoreError::NotFound {
                entity: "Task",
                id: task_id,
            })?;
        tx.commit().await.map_err(store_error)?;
        Ok(task)
    }

    /// Delete a task, closing the gap in its column.
    pub async fn delete_task(&self, actor: &Actor, task_id: DbId) -> Result<(), CoreError> {
        authorize(actor, Permission::DeleteTask)?;

        self.retry_transient("delete_task", || self.delete_task_attempt(actor, task_id))
            .await?;

        tracing::info!(task_id = %task_id, actor_id = %actor.id, "Task deleted");
        Ok(())
    }

    async fn delete_task_attempt(&self, actor: &Actor, task_id: DbId) -> Result<(), CoreError> {
        let task = self.load_task(task_id).await?;
        let column = self.load_column(task.column_id).await?;
        self.check_member(actor, column.project_id).await?;

        let mut tx = self.pool.begin().await.map_err(store_error)?;
        lock_containers(&mut tx, &[Container::Column(task.column_id)]).await?;

        let current = locked_task(&mut tx, task.column_id, task_id).await?;
        ChainManager::remove(&mut TaskChain::new(&mut tx), &current).await?;
        tx.commit().await.map_err(store_error)?;
        Ok(())
    }
}

/// Re-read a column after its lock was taken.
async fn locked_column(conn: &mut sqlx::PgConnection, column_id: DbId) -> Result<Column, CoreError> {
    ColumnRepo::find_by_id(&mut *conn, column_id)
        .await
        .map_err(store_error)?
        .ok_or(CoreError::NotFound {
            entity: "Column",
            id: column_id,
        })
}

/// Re-read a task after the lock on `expected_column` was taken.
///
/// A task that changed column in the meantime is reported as transient so the
/// whole operation is retried against the new column.
async fn locked_task(
    conn: &mut sqlx::PgConnection,
    expected_column: DbId,
    task_id: DbId,
) -> Result<Task, CoreError> {
    let task = TaskRepo::find_by_id(&mut *conn, task_id)
        .await
        .map_err(store_error)?
        .ok_or(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        })?;
    if task.column_id != expected_column {
        return Err(CoreError::Transient(format!(
            "task {task_id} moved to column {} concurrently",
            task.column_id
        )));
    }
    Ok(task)
}
