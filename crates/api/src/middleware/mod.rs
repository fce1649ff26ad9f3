//! Request extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the calling [`Actor`](kanban_core::authorization::Actor)
//!   from a JWT Bearer token.
//!
//! Capability checks are not done here: every kanban service method runs the
//! authorization gate itself.

pub mod auth;
