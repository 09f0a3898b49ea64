//! Counseling Command and Query Handlers
//!
//! ## Commands
//! - `TurnCommand` - Process one user message (first or subsequent turn)
//! - `purge` - Remove a session
//!
//! ## Queries
//! - `get_history` / `get_state` - Read stored session facets
//!
//! ## Collaborators
//! - `ExpertRouter` - One-time roster selection
//! - `AnalysisFanOut` - Per-expert analysis calls
//! - `ResponseComposer` - Lead agent reply
//! - `SessionLocks` - Per-session turn serialization

mod composer;
mod errors;
mod fan_out;
mod orchestrator;
mod router;
mod session_locks;

pub use composer::ResponseComposer;
pub use errors::CounselingError;
pub use fan_out::AnalysisFanOut;
pub use orchestrator::{
    CounselingOrchestrator, OrchestratorSettings, TurnCommand, TurnResult,
};
pub use router::ExpertRouter;
pub use session_locks::SessionLocks;
