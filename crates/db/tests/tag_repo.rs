//! Integration tests for tags and task-tag associations.

use kanban_db::models::column::CreateColumn;
use kanban_db::models::tag::CreateTag;
use kanban_db::models::task::CreateTask;
use kanban_db::repositories::{ColumnRepo, TagRepo, TaskRepo};
use sqlx::PgPool;
use uuid::Uuid;

fn new_tag(title: &str) -> CreateTag {
    CreateTag {
        title: title.to_string(),
    }
}

async fn seed_task(pool: &PgPool, project_id: Uuid) -> Uuid {
    let column = ColumnRepo::create(
        pool,
        project_id,
        &CreateColumn {
            title: "Todo".to_string(),
            wip_limit: None,
        },
    )
    .await
    .unwrap();
    let task = TaskRepo::create(
        pool,
        column.id,
        &CreateTask {
            title: "Task".to_string(),
            color: None,
            content: None,
            story_point: 0,
            start_time: None,
            end_time: None,
            executor_id: None,
        },
    )
    .await
    .unwrap();
    task.id
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_title_rejected_within_project(pool: PgPool) {
    let project_id = Uuid::new_v4();
    TagRepo::create(&pool, project_id, &new_tag("bug")).await.unwrap();

    let result = TagRepo::create(&pool, project_id, &new_tag("bug")).await;
    assert!(result.is_err(), "Duplicate tag title should fail");

    TagRepo::create(&pool, Uuid::new_v4(), &new_tag("bug"))
        .await
        .unwrap();
    let found = TagRepo::find_by_title(&pool, project_id, "bug").await.unwrap();
    assert!(found.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_link_and_unlink(pool: PgPool) {
    let project_id = Uuid::new_v4();
    let task_id = seed_task(&pool, project_id).await;
    let tag = TagRepo::create(&pool, project_id, &new_tag("bug")).await.unwrap();

    assert!(!TagRepo::has_link(&pool, task_id, tag.id).await.unwrap());
    let link = TagRepo::link(&pool, task_id, tag.id).await.unwrap();
    assert_eq!(link.task_id, task_id);
    assert!(TagRepo::has_link(&pool, task_id, tag.id).await.unwrap());

    assert!(TagRepo::link(&pool, task_id, tag.id).await.is_err());

    assert!(TagRepo::unlink(&pool, task_id, tag.id).await.unwrap());
    assert!(!TagRepo::unlink(&pool, task_id, tag.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_tag_cascades_associations(pool: PgPool) {
    let project_id = Uuid::new_v4();
    let task_id = seed_task(&pool, project_id).await;
    let tag = TagRepo::create(&pool, project_id, &new_tag("bug")).await.unwrap();
    TagRepo::link(&pool, task_id, tag.id).await.unwrap();

    assert!(TagRepo::delete(&pool, tag.id).await.unwrap());
    assert!(!TagRepo::has_link(&pool, task_id, tag.id).await.unwrap());
    assert!(TaskRepo::find_by_id(&pool, task_id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_stats_count_tasks_per_tag(pool: PgPool) {
    let project_id = Uuid::new_v4();
    let first = seed_task(&pool, project_id).await;
    let second = seed_task(&pool, project_id).await;
    let bug = TagRepo::create(&pool, project_id, &new_tag("bug")).await.unwrap();
    TagRepo::create(&pool, project_id, &new_tag("idea")).await.unwrap();
    TagRepo::link(&pool, first, bug.id).await.unwrap();
    TagRepo::link(&pool, second, bug.id).await.unwrap();

    let stats = TagRepo::stats(&pool, project_id).await.unwrap();
    let pairs: Vec<(String, i64)> = stats.into_iter().map(|s| (s.title, s.count)).collect();
    assert_eq!(pairs, [("bug".to_string(), 2), ("idea".to_string(), 0)]);
}
