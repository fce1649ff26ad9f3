//! Persistence layer: connection pool, migrations, row models, repositories
//! and the PostgreSQL-backed chain stores.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgConnection;

use kanban_core::error::CoreError;
use kanban_core::types::DbId;

pub mod chain;
pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// SQLSTATE raised when a serializable transaction cannot be ordered.
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE raised when PostgreSQL breaks a lock cycle.
const DEADLOCK_DETECTED: &str = "40P01";
/// SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Map a store failure onto the domain taxonomy.
///
/// Lock and serialization conflicts become [`CoreError::Transient`] so the
/// caller can retry the whole transaction.
pub fn store_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => {
                return CoreError::Transient(db_err.message().to_string());
            }
            Some(UNIQUE_VIOLATION) => {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Internal(err.to_string())
}

/// A container whose chain is being rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Container {
    /// The column chain of a project.
    Project(DbId),
    /// The task chain of a column.
    Column(DbId),
}

impl Container {
    fn lock_key(&self) -> String {
        match self {
            Container::Project(id) => format!("project:{id}"),
            Container::Column(id) => format!("column:{id}"),
        }
    }
}

/// Take transaction-scoped exclusive locks on `containers`.
///
/// Locks are taken in sorted order so two transactions touching the same
/// pair of containers cannot deadlock. They are released on commit or
/// rollback.
pub async fn lock_containers(
    conn: &mut PgConnection,
    containers: &[Container],
) -> Result<(), CoreError> {
    let mut ordered = containers.to_vec();
    ordered.sort();
    ordered.dedup();

    for container in ordered {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(container.lock_key())
            .execute(&mut *conn)
            .await
            .map_err(store_error)?;
    }
    Ok(())
}
