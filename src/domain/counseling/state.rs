//! Counseling state: the per-session phase machine record.

use serde::{Deserialize, Serialize};

use super::phase::CounselingPhase;

/// Which branch of the turn state machine an incoming message takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    /// The session has not completed a turn yet.
    FirstTurn,
    /// At least one turn has been completed.
    SubsequentTurn,
}

/// Persisted `(phase, turn_count)` for a session.
///
/// `started` records explicitly that the first turn completed, so first-turn
/// detection does not depend on the history being non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounselingState {
    pub phase: CounselingPhase,
    pub turn_count: u32,
    #[serde(default)]
    pub started: bool,
}

impl Default for CounselingState {
    fn default() -> Self {
        Self {
            phase: CounselingPhase::Exploration,
            turn_count: 0,
            started: false,
        }
    }
}

impl CounselingState {
    /// State after a successful first turn: `(Exploration, 1)`.
    pub fn after_first_turn() -> Self {
        Self {
            phase: CounselingPhase::Exploration,
            turn_count: 1,
            started: true,
        }
    }

    pub fn turn_kind(&self) -> TurnKind {
        // Records written before `started` existed still carry a turn count.
        if self.started || self.turn_count > 0 {
            TurnKind::SubsequentTurn
        } else {
            TurnKind::FirstTurn
        }
    }

    /// State for the next turn.
    ///
    /// Increments the turn count, then maps it to a phase. A phase already
    /// reached is never given back, even if the stored count disagrees.
    pub fn advance(&self) -> Self {
        let turn_count = self.turn_count.saturating_add(1);
        let phase = CounselingPhase::for_turn(turn_count).max(self.phase);
        Self {
            phase,
            turn_count,
            started: true,
        }
    }

    /// True if advancing moved the session into a new phase.
    pub fn entered_new_phase(&self, previous: &Self) -> bool {
        self.phase != previous.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unstarted_exploration() {
        let state = CounselingState::default();
        assert_eq!(state.phase, CounselingPhase::Exploration);
        assert_eq!(state.turn_count, 0);
        assert_eq!(state.turn_kind(), TurnKind::FirstTurn);
    }

    #[test]
    fn first_turn_state_is_exploration_one() {
        let state = CounselingState::after_first_turn();
        assert_eq!(state.phase, CounselingPhase::Exploration);
        assert_eq!(state.turn_count, 1);
        assert_eq!(state.turn_kind(), TurnKind::SubsequentTurn);
    }

    #[test]
    fn advance_from_turn_two_enters_insight() {
        let state = CounselingState {
            phase: CounselingPhase::Exploration,
            turn_count: 2,
            started: true,
        };
        let next = state.advance();

        assert_eq!(next.turn_count, 3);
        assert_eq!(next.phase, CounselingPhase::Insight);
        assert!(next.entered_new_phase(&state));
    }

    #[test]
    fn advance_never_reverts_phase() {
        let state = CounselingState {
            phase: CounselingPhase::Action,
            turn_count: 1,
            started: true,
        };
        assert_eq!(state.advance().phase, CounselingPhase::Action);
    }

    #[test]
    fn legacy_records_without_started_flag_deserialize() {
        let state: CounselingState =
            serde_json::from_str(r#"{"phase":"Insight","turn_count":3}"#).unwrap();
        assert_eq!(state.phase, CounselingPhase::Insight);
        assert!(!state.started);
        assert_eq!(state.turn_kind(), TurnKind::SubsequentTurn);
    }
}
