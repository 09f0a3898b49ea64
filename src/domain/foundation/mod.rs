//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers and error types used across the counseling domain.

mod errors;
mod ids;

pub use errors::ValidationError;
pub use ids::SessionId;
