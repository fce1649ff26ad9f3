//! Board operations behind the authorization gate.
//!
//! Every public method takes the calling [`Actor`] and runs, in order: the
//! gate, payload validation, entity lookup, the project membership check and
//! finally the store work. Chain mutations run in a single transaction that
//! first locks the affected containers; attempts that hit a lock or
//! serialization conflict are retried up to the configured limit.

mod columns;
mod tags;
mod tasks;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use kanban_core::authorization::Actor;
use kanban_core::chain::OrderedChain;
use kanban_core::error::CoreError;
use kanban_core::membership::{ensure_member, MembershipOracle};
use kanban_core::types::DbId;
use kanban_db::models::column::Column;
use kanban_db::models::task::{Task, TaskView};
use kanban_db::models::validation_message;
use kanban_db::repositories::ColumnRepo;
use kanban_db::{store_error, DbPool};
use validator::Validate;

/// Pause before the first retry of a conflicting attempt.
const RETRY_INITIAL_DELAY: Duration = Duration::from_millis(10);
/// Upper bound on the pause between attempts.
const RETRY_MAX_DELAY: Duration = Duration::from_millis(200);

/// Pause after the `attempt`-th failed try, doubling each time.
fn retry_delay(attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    RETRY_INITIAL_DELAY
        .saturating_mul(factor)
        .min(RETRY_MAX_DELAY)
}

/// Column, task and tag operations for one deployment.
pub struct KanbanService {
    pool: DbPool,
    membership: Arc<dyn MembershipOracle>,
    retry_limit: u32,
}

impl KanbanService {
    pub fn new(pool: DbPool, membership: Arc<dyn MembershipOracle>, retry_limit: u32) -> Self {
        Self {
            pool,
            membership,
            retry_limit: retry_limit.max(1),
        }
    }

    /// Fail with `AccessDenied` unless `actor` belongs to `project_id`.
    async fn check_member(&self, actor: &Actor, project_id: DbId) -> Result<(), CoreError> {
        ensure_member(self.membership.as_ref(), project_id, actor.id).await
    }

    /// Load a column or fail with `NotFound`.
    async fn load_column(&self, column_id: DbId) -> Result<Column, CoreError> {
        ColumnRepo::find_by_id(&self.pool, column_id)
            .await
            .map_err(store_error)?
            .ok_or(CoreError::NotFound {
                entity: "Column",
                id: column_id,
            })
    }

    /// Run `attempt` until it succeeds, fails with a non-transient error or
    /// the retry budget is spent. Retries back off exponentially.
    async fn retry_transient<T, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt: F,
    ) -> Result<T, CoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let mut tries = 0;
        loop {
            tries += 1;
            match attempt().await {
                Err(err) if err.is_transient() && tries < self.retry_limit => {
                    let delay = retry_delay(tries);
                    tracing::warn!(
                        operation,
                        attempt = tries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying after store conflict",
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }
}

/// Run the derived `validator` rules, mapping failures to `Validation`.
fn validate_input<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(validation_message(&e)))
}

/// Unwrap an ordered container, logging when the chain was malformed.
fn settled<T>(kind: &'static str, scope: DbId, chain: OrderedChain<T>) -> Vec<T> {
    let OrderedChain { items, violation } = chain;
    if let Some(violation) = violation {
        tracing::warn!(
            kind,
            scope_id = %scope,
            violation = %violation,
            "Malformed chain, returning best-effort order",
        );
    }
    items
}

/// Tasks of one column in chain order, with derived status.
fn task_views(column_id: DbId, tasks: OrderedChain<Task>) -> Vec<TaskView> {
    settled("task", column_id, tasks)
        .into_iter()
        .map(TaskView::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    use super::*;

    struct Nobody;

    #[async_trait]
    impl MembershipOracle for Nobody {
        async fn is_member(&self, _project_id: DbId, _user_id: DbId) -> bool {
            false
        }
    }

    fn service(retry_limit: u32) -> KanbanService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        KanbanService::new(pool, Arc::new(Nobody), retry_limit)
    }

    #[tokio::test]
    async fn transient_errors_are_retried_up_to_the_limit() {
        let svc = service(3);
        let calls = &AtomicU32::new(0);

        let result: Result<(), CoreError> = svc
            .retry_transient("test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(CoreError::Transient("deadlock".into()))
            })
            .await;

        assert_matches!(result, Err(CoreError::Transient(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn success_after_conflict_is_returned() {
        let svc = service(3);
        let calls = &AtomicU32::new(0);

        let result = svc
            .retry_transient("test", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(CoreError::Transient("serialization failure".into()))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let svc = service(5);
        let calls = &AtomicU32::new(0);

        let result: Result<(), CoreError> = svc
            .retry_transient("test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(CoreError::Validation("bad".into()))
            })
            .await;

        assert_matches!(result, Err(CoreError::Validation(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn retry_delay_doubles_up_to_the_cap() {
        assert_eq!(retry_delay(1), Duration::from_millis(10));
        assert_eq!(retry_delay(2), Duration::from_millis(20));
        assert_eq!(retry_delay(3), Duration::from_millis(40));
        assert_eq!(retry_delay(10), RETRY_MAX_DELAY);
        assert_eq!(retry_delay(u32::MAX), RETRY_MAX_DELAY);
    }

    #[tokio::test]
    async fn non_member_is_denied() {
        let svc = service(1);
        let actor = Actor::new(Uuid::new_v4(), kanban_core::authorization::UserState::Active, []);
        let err = svc.check_member(&actor, Uuid::new_v4()).await.unwrap_err();
        assert_matches!(err, CoreError::AccessDenied(_));
    }
}
