//! Command and query handlers.

pub mod counseling;

pub use counseling::{
    AnalysisFanOut, CounselingError, CounselingOrchestrator, ExpertRouter, OrchestratorSettings,
    ResponseComposer, SessionLocks, TurnCommand, TurnResult,
};
