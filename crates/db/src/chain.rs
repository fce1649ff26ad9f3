//! PostgreSQL-backed [`ChainStore`]s.
//!
//! Both stores borrow a connection that is expected to be inside a
//! transaction already holding the container lock (see
//! [`crate::lock_containers`]).

use async_trait::async_trait;
use sqlx::PgConnection;

use kanban_core::chain::ChainStore;
use kanban_core::error::CoreError;
use kanban_core::types::DbId;

use crate::models::column::{Column, CreateColumn};
use crate::models::task::{CreateTask, Task};
use crate::repositories::{ColumnRepo, TaskRepo};
use crate::store_error;

/// The column chain of a project.
pub struct ColumnChain<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ColumnChain<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<'c> ChainStore for ColumnChain<'c> {
    type Item = Column;
    type Draft = CreateColumn;

    fn entity(&self) -> &'static str {
        "Column"
    }

    async fn find(&mut self, id: DbId) -> Result<Option<Column>, CoreError> {
        ColumnRepo::find_by_id(&mut *self.conn, id)
            .await
            .map_err(store_error)
    }

    async fn find_tail(
        &mut self,
        scope: DbId,
        exclude: Option<DbId>,
    ) -> Result<Option<Column>, CoreError> {
        ColumnRepo::find_tail(&mut *self.conn, scope, exclude)
            .await
            .map_err(store_error)
    }

    async fn find_predecessor(
        &mut self,
        scope: DbId,
        id: DbId,
    ) -> Result<Option<Column>, CoreError> {
        ColumnRepo::find_predecessor(&mut *self.conn, scope, id)
            .await
            .map_err(store_error)
    }

    async fn list(&mut self, scope: DbId) -> Result<Vec<Column>, CoreError> {
        ColumnRepo::list_by_project(&mut *self.conn, scope)
            .await
            .map_err(store_error)
    }

    async fn insert(&mut self, scope: DbId, draft: CreateColumn) -> Result<Column, CoreError> {
        ColumnRepo::create(&mut *self.conn, scope, &draft)
            .await
            .map_err(store_error)
    }

    async fn set_child(&mut self, id: DbId, child_id: Option<DbId>) -> Result<(), CoreError> {
        ColumnRepo::set_child(&mut *self.conn, id, child_id)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn set_scope(&mut self, _id: DbId, _scope: DbId) -> Result<(), CoreError> {
        Err(CoreError::Validation(
            "columns cannot move between projects".into(),
        ))
    }

    async fn delete(&mut self, id: DbId) -> Result<(), CoreError> {
        ColumnRepo::delete(&mut *self.conn, id)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}

/// The task chain of a column.
pub struct TaskChain<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> TaskChain<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<'c> ChainStore for TaskChain<'c> {
    type Item = Task;
    type Draft = CreateTask;

    fn entity(&self) -> &'static str {
        "Task"
    }

    async fn find(&mut self, id: DbId) -> Result<Option<Task>, CoreError> {
        TaskRepo::find_by_id(&mut *self.conn, id)
            .await
            .map_err(store_error)
    }

    async fn find_tail(
        &mut self,
        scope: DbId,
        exclude: Option<DbId>,
    ) -> Result<Option<Task>, CoreError> {
        TaskRepo::find_tail(&mut *self.conn, scope, exclude)
            .await
            .map_err(store_error)
    }

    async fn find_predecessor(
        &mut self,
        scope: DbId,
        id: DbId,
    ) -> Result<Option<Task>, CoreError> {
        TaskRepo::find_predecessor(&mut *self.conn, scope, id)
            .await
            .map_err(store_error)
    }

    async fn list(&mut self, scope: DbId) -> Result<Vec<Task>, CoreError> {
        TaskRepo::list_by_column(&mut *self.conn, scope)
            .await
            .map_err(store_error)
    }

    async fn insert(&mut self, scope: DbId, draft: CreateTask) -> Result<Task, CoreError> {
        TaskRepo::create(&mut *self.conn, scope, &draft)
            .await
            .map_err(store_error)
    }

    async fn set_child(&mut self, id: DbId, child_id: Option<DbId>) -> Result<(), CoreError> {
        TaskRepo::set_child(&mut *self.conn, id, child_id)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn set_scope(&mut self, id: DbId, scope: DbId) -> Result<(), CoreError> {
        TaskRepo::set_column(&mut *self.conn, id, scope)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn delete(&mut self, id: DbId) -> Result<(), CoreError> {
        TaskRepo::delete(&mut *self.conn, id)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}
