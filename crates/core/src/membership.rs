//! Project membership seam.
//!
//! Membership lives in an external project service. Implementations must
//! never surface transport failures to the caller: any error means "not a
//! member", so a flaky dependency degrades to access denied.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::DbId;

#[async_trait]
pub trait MembershipOracle: Send + Sync {
    /// Whether `user_id` belongs to `project_id`. Errors are reported as `false`.
    async fn is_member(&self, project_id: DbId, user_id: DbId) -> bool;
}

/// Fail with [`CoreError::AccessDenied`] unless the user belongs to the project.
pub async fn ensure_member(
    oracle: &dyn MembershipOracle,
    project_id: DbId,
    user_id: DbId,
) -> Result<(), CoreError> {
    if oracle.is_member(project_id, user_id).await {
        Ok(())
    } else {
        Err(CoreError::AccessDenied(format!(
            "user {user_id} is not a member of project {project_id}"
        )))
    }
}
