//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token generation and validation.
//!
//! Tokens are issued by the user directory; this service only verifies them
//! and reads the caller's state and capabilities from the claims.

pub mod jwt;
