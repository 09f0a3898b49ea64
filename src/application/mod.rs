//! Application layer - Handlers and wiring.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! `handlers` holds the counseling use cases; `bootstrap` assembles them
//! from configuration.

pub mod bootstrap;
pub mod handlers;

pub use bootstrap::{build_orchestrator, build_provider, build_store};
pub use handlers::{
    CounselingError, CounselingOrchestrator, OrchestratorSettings, TurnCommand, TurnResult,
};
