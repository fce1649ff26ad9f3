//! Tag lifecycle and task-tag associations.
//!
//! Tags never take part in a chain, so these operations run as single
//! statements without container locks. Unique constraints in the store back
//! the duplicate checks when two requests race.

use kanban_core::authorization::{authorize, Actor, Permission};
use kanban_core::error::CoreError;
use kanban_core::types::DbId;
use kanban_db::models::tag::{CreateTag, Tag, TagStat};
use kanban_db::repositories::TagRepo;
use kanban_db::store_error;

use super::{validate_input, KanbanService};

impl KanbanService {
    /// Create a tag. Titles are unique within a project.
    pub async fn create_tag(
        &self,
        actor: &Actor,
        project_id: DbId,
        input: CreateTag,
    ) -> Result<Tag, CoreError> {
        authorize(actor, Permission::UpdateTask)?;
        validate_input(&input)?;
        self.check_member(actor, project_id).await?;

        let duplicate = || CoreError::Validation(format!("Tag '{}' already exists", input.title));
        let existing = TagRepo::find_by_title(&self.pool, project_id, &input.title)
            .await
            .map_err(store_error)?;
        if existing.is_some() {
            return Err(duplicate());
        }

        let tag = TagRepo::create(&self.pool, project_id, &input)
            .await
            .map_err(|e| match store_error(e) {
                CoreError::Conflict(_) => duplicate(),
                other => other,
            })?;

        tracing::info!(tag_id = %tag.id, project_id = %project_id, actor_id = %actor.id, "Tag created");
        Ok(tag)
    }

    /// Delete a tag together with its task associations.
    pub async fn delete_tag(&self, actor: &Actor, tag_id: DbId) -> Result<(), CoreError> {
        authorize(actor, Permission::UpdateTask)?;
        let tag = self.load_tag(tag_id).await?;
        self.check_member(actor, tag.project_id).await?;

        TagRepo::delete(&self.pool, tag_id)
            .await
            .map_err(store_error)?;

        tracing::info!(tag_id = %tag_id, actor_id = %actor.id, "Tag deleted");
        Ok(())
    }

    pub async fn list_tags(&self, actor: &Actor, project_id: DbId) -> Result<Vec<Tag>, CoreError> {
        authorize(actor, Permission::GetTask)?;
        self.check_member(actor, project_id).await?;

        TagRepo::list_by_project(&self.pool, project_id)
            .await
            .map_err(store_error)
    }

    /// Attach a tag to a task.
    ///
    /// Attaching a tag the task already carries fails with a not-found style
    /// error, as does a missing task or tag.
    pub async fn set_tag(&self, actor: &Actor, task_id: DbId, tag_id: DbId) -> Result<(), CoreError> {
        authorize(actor, Permission::UpdateTask)?;
        self.resolve_association(actor, task_id, tag_id).await?;

        let already_set = || CoreError::Missing(format!("Tag {tag_id} is already set on task {task_id}"));
        if TagRepo::has_link(&self.pool, task_id, tag_id)
            .await
            .map_err(store_error)?
        {
            return Err(already_set());
        }

        TagRepo::link(&self.pool, task_id, tag_id)
            .await
            .map_err(|e| match store_error(e) {
                CoreError::Conflict(_) => already_set(),
                other => other,
            })?;

        tracing::info!(task_id = %task_id, tag_id = %tag_id, actor_id = %actor.id, "Tag set");
        Ok(())
    }

    /// Detach a tag from a task.
    pub async fn unset_tag(
        &self,
        actor: &Actor,
        task_id: DbId,
        tag_id: DbId,
    ) -> Result<(), CoreError> {
        authorize(actor, Permission::UpdateTask)?;
        self.resolve_association(actor, task_id, tag_id).await?;

        let removed = TagRepo::unlink(&self.pool, task_id, tag_id)
            .await
            .map_err(store_error)?;
        if !removed {
            return Err(CoreError::Missing(format!(
                "Tag {tag_id} is not set on task {task_id}"
            )));
        }

        tracing::info!(task_id = %task_id, tag_id = %tag_id, actor_id = %actor.id, "Tag unset");
        Ok(())
    }

    /// Number of tasks carrying each tag of a project.
    pub async fn tag_stats(
        &self,
        actor: &Actor,
        project_id: DbId,
    ) -> Result<Vec<TagStat>, CoreError> {
        authorize(actor, Permission::GetTask)?;
        self.check_member(actor, project_id).await?;

        TagRepo::stats(&self.pool, project_id)
            .await
            .map_err(store_error)
    }

    async fn load_tag(&self, tag_id: DbId) -> Result<Tag, CoreError> {
        TagRepo::find_by_id(&self.pool, tag_id)
            .await
            .map_err(store_error)?
            .ok_or(CoreError::NotFound {
                entity: "Tag",
                id: tag_id,
            })
    }

    /// Check that the task and tag exist, the actor belongs to the task's
    /// project, and the tag belongs to that same project.
    async fn resolve_association(
        &self,
        actor: &Actor,
        task_id: DbId,
        tag_id: DbId,
    ) -> Result<(), CoreError> {
        let task = self.load_task(task_id).await?;
        let column = self.load_column(task.column_id).await?;
        self.check_member(actor, column.project_id).await?;

        let tag = self.load_tag(tag_id).await?;
        if tag.project_id != column.project_id {
            return Err(CoreError::Validation(format!(
                "Tag {tag_id} belongs to a different project"
            )));
        }
        Ok(())
    }
}
