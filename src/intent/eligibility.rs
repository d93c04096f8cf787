//! Phase eligibility table
//!
//! The dispatcher consults [`ELIGIBILITY`] before running any handler. An
//! intent missing from its phase's row is routed to FALLBACK. Keeping the
//! table as data means a new [`Intent`] variant is unreachable until someone
//! adds it to a row; the test below fails for any intent no row mentions.

use super::Intent;
use crate::session::Phase;

pub const ELIGIBILITY: &[(Phase, &[Intent])] = &[
    (
        Phase::NotStarted,
        &[
            Intent::StartGame,
            Intent::ChooseSide,
            Intent::WakeUpPrompt,
            Intent::WakeUpYes,
            Intent::WakeUpNo,
            Intent::Fallback,
            Intent::Hello,
        ],
    ),
    (
        Phase::InProgress,
        &[
            Intent::MovePiece,
            Intent::HowPieceMoves,
            Intent::BestMove,
            Intent::PossibleActions,
            Intent::RestartGame,
            Intent::RestartGameYes,
            Intent::RestartGameNo,
            Intent::UndoMove,
            Intent::Fallback,
            Intent::Hello,
        ],
    ),
    // Placeholder: a finished game only chats
    (Phase::Finished, &[Intent::Fallback, Intent::Hello]),
];

pub fn is_eligible(phase: Phase, intent: Intent) -> bool {
    ELIGIBILITY
        .iter()
        .find(|(row_phase, _)| *row_phase == phase)
        .is_some_and(|(_, intents)| intents.contains(&intent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_intent_has_a_phase() {
        for intent in Intent::ALL {
            assert!(
                ELIGIBILITY.iter().any(|(_, row)| row.contains(&intent)),
                "{} is not eligible in any phase",
                intent
            );
        }
    }

    #[test]
    fn test_chat_intents_everywhere() {
        for phase in [Phase::NotStarted, Phase::InProgress, Phase::Finished] {
            assert!(is_eligible(phase, Intent::Hello));
            assert!(is_eligible(phase, Intent::Fallback));
        }
    }

    #[test]
    fn test_moves_only_in_progress() {
        assert!(!is_eligible(Phase::NotStarted, Intent::MovePiece));
        assert!(is_eligible(Phase::InProgress, Intent::MovePiece));
        assert!(!is_eligible(Phase::Finished, Intent::MovePiece));
    }

    #[test]
    fn test_side_choice_only_before_start() {
        assert!(is_eligible(Phase::NotStarted, Intent::ChooseSide));
        assert!(!is_eligible(Phase::InProgress, Intent::ChooseSide));
        assert!(!is_eligible(Phase::Finished, Intent::RestartGame));
    }
}
