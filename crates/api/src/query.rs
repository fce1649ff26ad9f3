//! Query parameter types shared by the handler modules.

use kanban_core::types::DbId;
use serde::Deserialize;

/// `?project_id=` for project-scoped endpoints.
#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    pub project_id: DbId,
}

/// `?column_id=` for column-scoped task endpoints.
#[derive(Debug, Deserialize)]
pub struct ColumnQuery {
    pub column_id: DbId,
}

/// `?details=` for the version endpoint.
#[derive(Debug, Deserialize)]
pub struct VersionParams {
    #[serde(default)]
    pub details: bool,
}
