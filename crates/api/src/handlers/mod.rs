//! Axum handlers. Each one extracts the caller, delegates to
//! [`KanbanService`](crate::kanban::KanbanService) and wraps the result in the
//! `{ "data": ... }` envelope.

pub mod columns;
pub mod stats;
pub mod tags;
pub mod tasks;
