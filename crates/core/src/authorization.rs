//! Actor identity and the authorization gate.
//!
//! Every kanban operation calls [`authorize`] before touching the store. The
//! gate checks the actor's account state first and the granted capability
//! second; whichever fails first short-circuits with [`CoreError::Forbidden`].

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Capabilities an actor can be granted by the user directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    GetColumn,
    CreateColumn,
    UpdateColumn,
    DeleteColumn,
    GetTask,
    CreateTask,
    UpdateTask,
    DeleteTask,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::GetColumn,
        Permission::CreateColumn,
        Permission::UpdateColumn,
        Permission::DeleteColumn,
        Permission::GetTask,
        Permission::CreateTask,
        Permission::UpdateTask,
        Permission::DeleteTask,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::GetColumn => "GET_COLUMN",
            Permission::CreateColumn => "CREATE_COLUMN",
            Permission::UpdateColumn => "UPDATE_COLUMN",
            Permission::DeleteColumn => "DELETE_COLUMN",
            Permission::GetTask => "GET_TASK",
            Permission::CreateTask => "CREATE_TASK",
            Permission::UpdateTask => "UPDATE_TASK",
            Permission::DeleteTask => "DELETE_TASK",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown permission '{s}'")))
    }
}

/// Account state as reported by the user directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserState {
    Active,
    Unconfirmed,
    Blocked,
    Deleted,
    /// Any state this service does not know about.
    #[serde(other)]
    Unknown,
}

/// The caller of a kanban operation, passed explicitly into every service call.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: DbId,
    pub state: UserState,
    pub permissions: HashSet<Permission>,
}

impl Actor {
    pub fn new(id: DbId, state: UserState, permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            id,
            state,
            permissions: permissions.into_iter().collect(),
        }
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// State check, then capability check.
pub fn authorize(actor: &Actor, required: Permission) -> Result<(), CoreError> {
    if actor.state != UserState::Active {
        return Err(CoreError::Forbidden("actor not active".into()));
    }
    if !actor.has(required) {
        return Err(CoreError::Forbidden(format!(
            "missing capability {required}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use uuid::Uuid;

    use super::*;

    fn actor(state: UserState, permissions: &[Permission]) -> Actor {
        Actor::new(Uuid::new_v4(), state, permissions.iter().copied())
    }

    #[test]
    fn active_actor_with_capability_passes() {
        let a = actor(UserState::Active, &[Permission::GetColumn]);
        assert!(authorize(&a, Permission::GetColumn).is_ok());
    }

    #[test]
    fn inactive_actor_is_rejected_before_capability() {
        let a = actor(UserState::Blocked, &Permission::ALL);
        let err = authorize(&a, Permission::GetColumn).unwrap_err();
        assert_matches!(err, CoreError::Forbidden(msg) if msg == "actor not active");
    }

    #[test]
    fn missing_capability_is_forbidden() {
        let a = actor(UserState::Active, &[Permission::GetTask]);
        let err = authorize(&a, Permission::DeleteTask).unwrap_err();
        assert_matches!(err, CoreError::Forbidden(msg) if msg.starts_with("missing capability"));
    }

    #[test]
    fn unknown_state_is_not_active() {
        let state: UserState = serde_json::from_str("\"SUSPENDED\"").unwrap();
        assert_eq!(state, UserState::Unknown);
        let a = actor(state, &Permission::ALL);
        assert!(authorize(&a, Permission::GetTask).is_err());
    }

    #[test]
    fn permission_names_round_trip_through_from_str() {
        for p in Permission::ALL {
            assert_eq!(p.as_str().parse::<Permission>().unwrap(), p);
        }
        assert!("ADMIN".parse::<Permission>().is_err());
    }
}
