//! Domain layer containing counseling rules and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (session ids, validation errors)
//! - `counseling` - History window, phase machine, expert registry, routing, prompts

pub mod counseling;
pub mod foundation;
