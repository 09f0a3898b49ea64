//! Counseling domain.
//!
//! Pure types and rules for a multi-expert counseling session: history and
//! its window, the phase machine, the expert registry, router output
//! validation, and prompt assembly. Nothing here performs I/O.

pub mod experts;
pub mod history;
pub mod phase;
pub mod profile;
pub mod prompts;
pub mod report;
pub mod roster;
pub mod routing;
pub mod state;

pub use experts::{instruction_for, registry_names, Expert, UnknownExpert};
pub use history::{render_transcript, window, History, HistoryEntry, Role};
pub use phase::{advance, CounselingPhase};
pub use profile::{IntakeForm, UserProfile};
pub use report::{render_reports, ExpertReport, ReportOutcome};
pub use roster::{default_roster, SelectedExperts, MAX_ROSTER_SIZE};
pub use routing::{parse_router_output, RouterParseError};
pub use state::{CounselingState, TurnKind};
