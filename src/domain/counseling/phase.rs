//! Counseling phases.
//!
//! The phase governs the lead agent's response strategy. It is a pure
//! function of the session-lifetime turn count and only ever moves forward:
//! `Exploration` → `Insight` → `Action`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// First turn (post-increment) that belongs to the Insight phase.
pub const INSIGHT_FROM_TURN: u32 = 3;

/// First turn (post-increment) that belongs to the Action phase.
pub const ACTION_FROM_TURN: u32 = 5;

/// The counseling stage.
///
/// Variants are declared in progression order, so `Ord` reflects how far
/// the session has advanced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum CounselingPhase {
    /// Ask open questions; no solutions yet.
    #[default]
    Exploration,
    /// Offer one or two reframing insights.
    Insight,
    /// Propose small, concrete actions. Terminal.
    Action,
}

impl CounselingPhase {
    /// Maps a (post-increment) turn count to its phase.
    ///
    /// `[1,3) → Exploration`, `[3,5) → Insight`, `[5,∞) → Action`. A count
    /// of zero means no turn has happened yet and maps to Exploration.
    pub fn for_turn(turn_count: u32) -> Self {
        if turn_count >= ACTION_FROM_TURN {
            Self::Action
        } else if turn_count >= INSIGHT_FROM_TURN {
            Self::Insight
        } else {
            Self::Exploration
        }
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Action)
    }

    /// Phase-specific instruction woven into the lead agent's final prompt.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Exploration => {
                "You are currently in the **'Exploration'** phase. Do not offer solutions or jump \
                 to conclusions. Instead, focus on asking deep, open-ended **'questions'** to \
                 verify aspects of the expert analyses that the user may not yet be aware of."
            }
            Self::Insight => {
                "You are currently in the **'Insight'** phase. It's time to move beyond \
                 questions. Synthesize the expert analyses to offer one or two **'key insights'** \
                 that help the user see their problem from a new perspective. Use gentle framing \
                 like, 'I wonder if...' or 'It seems as though...'"
            }
            Self::Action => {
                "You are currently in the **'Action'** phase. It's time to propose an \
                 **'action plan'** for concrete change. Suggest one or two small, practical \
                 actions the user can realistically try."
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Exploration => "Exploration",
            Self::Insight => "Insight",
            Self::Action => "Action",
        }
    }
}

impl fmt::Display for CounselingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Phase reached after one more turn on top of `turn_count`.
///
/// The count is incremented first, then mapped through
/// [`CounselingPhase::for_turn`].
pub fn advance(turn_count: u32) -> CounselingPhase {
    CounselingPhase::for_turn(turn_count.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn thresholds_match_turn_ranges() {
        assert_eq!(CounselingPhase::for_turn(1), CounselingPhase::Exploration);
        assert_eq!(CounselingPhase::for_turn(2), CounselingPhase::Exploration);
        assert_eq!(CounselingPhase::for_turn(3), CounselingPhase::Insight);
        assert_eq!(CounselingPhase::for_turn(4), CounselingPhase::Insight);
        assert_eq!(CounselingPhase::for_turn(5), CounselingPhase::Action);
    }

    #[test]
    fn advance_increments_before_mapping() {
        assert_eq!(advance(1), CounselingPhase::Exploration);
        assert_eq!(advance(2), CounselingPhase::Insight);
        assert_eq!(advance(4), CounselingPhase::Action);
    }

    #[test]
    fn action_is_terminal() {
        assert_eq!(advance(5), CounselingPhase::Action);
        assert_eq!(advance(100), CounselingPhase::Action);
        assert_eq!(advance(u32::MAX), CounselingPhase::Action);
        assert!(CounselingPhase::Action.is_terminal());
        assert!(!CounselingPhase::Insight.is_terminal());
    }

    #[test]
    fn ordering_follows_progression() {
        assert!(CounselingPhase::Exploration < CounselingPhase::Insight);
        assert!(CounselingPhase::Insight < CounselingPhase::Action);
    }

    #[test]
    fn directives_describe_phase_strategy() {
        assert!(CounselingPhase::Exploration.directive().contains("questions"));
        assert!(CounselingPhase::Insight.directive().contains("insights"));
        assert!(CounselingPhase::Action.directive().contains("action plan"));
    }

    #[test]
    fn serializes_as_variant_name() {
        let json = serde_json::to_string(&CounselingPhase::Insight).unwrap();
        assert_eq!(json, "\"Insight\"");
    }

    proptest! {
        #[test]
        fn advance_is_monotonic(t in 0u32..10_000) {
            prop_assert!(advance(t) <= advance(t + 1));
        }
    }
}
