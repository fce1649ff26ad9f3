//! Domain logic for the kanban backend: chain ordering, the authorization
//! gate, the membership seam and field rules. Nothing here touches the
//! database directly.

pub mod authorization;
pub mod board;
pub mod chain;
pub mod error;
pub mod membership;
pub mod types;
