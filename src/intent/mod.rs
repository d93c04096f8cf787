//! Intent vocabulary - what a classified utterance can ask for
//!
//! The classifier hands the engine an opaque intent identifier. This module
//! turns it into the closed [`Intent`] set; anything unrecognized becomes
//! [`Intent::Fallback`], so routing never has to deal with free-form strings.
//!
//! # Module Structure
//!
//! - `eligibility` - Which intents each session phase accepts
//! - `params` - Extracted parameters ([`IntentParams`])
//! - `classifier` - The [`IntentClassifier`] seam and a typed-command classifier

pub mod classifier;
pub mod eligibility;
pub mod params;

pub use classifier::{Classification, CommandClassifier, IntentClassifier};
pub use eligibility::{is_eligible, ELIGIBILITY};
pub use params::IntentParams;

use std::fmt;

/// Prefix of classifier resource names; the trailing segment is the intent id
pub const INTENT_NAME_BASE: &str = "projects/chess-master-andy-mhyo/agent/intents/";

/// Classifier ids of the deployed agent
const KNOWN_INTENT_IDS: &[(&str, Intent)] = &[
    ("2ab3d889-b6eb-494e-b822-9992da79280c", Intent::Fallback),
    ("fc298129-5845-44dc-a976-b7d6ca2f14c3", Intent::Hello),
    ("6fafe557-d27b-41e7-bef0-204a87036e2c", Intent::ChooseSide),
    ("67bf1b70-c4f3-44e5-976e-960837acff06", Intent::MovePiece),
    ("a18c9f1a-c779-4e99-b72c-20014150ddcf", Intent::HowPieceMoves),
    ("2b614d03-2366-4878-b22d-86df4003138d", Intent::WakeUpPrompt),
    ("f43bfd0d-940f-42b4-bee7-87e95334b0ae", Intent::WakeUpYes),
    ("125fac5a-266a-4715-98c9-4b95332f0e10", Intent::WakeUpNo),
    ("33ccbac2-0304-4e23-8299-8bc552ef1bba", Intent::PossibleActions),
];

/// Every intent the engine can fulfill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Hello,
    Fallback,
    WakeUpPrompt,
    WakeUpYes,
    WakeUpNo,
    StartGame,
    ChooseSide,
    MovePiece,
    HowPieceMoves,
    BestMove,
    PossibleActions,
    RestartGame,
    RestartGameYes,
    RestartGameNo,
    UndoMove,
}

impl Intent {
    pub const ALL: [Intent; 15] = [
        Intent::Hello,
        Intent::Fallback,
        Intent::WakeUpPrompt,
        Intent::WakeUpYes,
        Intent::WakeUpNo,
        Intent::StartGame,
        Intent::ChooseSide,
        Intent::MovePiece,
        Intent::HowPieceMoves,
        Intent::BestMove,
        Intent::PossibleActions,
        Intent::RestartGame,
        Intent::RestartGameYes,
        Intent::RestartGameNo,
        Intent::UndoMove,
    ];

    /// Internal name reported back to callers
    pub fn name(self) -> &'static str {
        match self {
            Intent::Hello => "HELLO",
            Intent::Fallback => "FALLBACK",
            Intent::WakeUpPrompt => "WAKE_UP_PROMPT",
            Intent::WakeUpYes => "WAKE_UP_FOLLOW_UP_YES",
            Intent::WakeUpNo => "WAKE_UP_FOLLOW_UP_NO",
            Intent::StartGame => "START_GAME",
            Intent::ChooseSide => "CHOOSE_SIDE",
            Intent::MovePiece => "MOVE_PIECE",
            Intent::HowPieceMoves => "HOW_PIECE_MOVES",
            Intent::BestMove => "BEST_MOVE",
            Intent::PossibleActions => "POSSIBLE_ACTIONS",
            Intent::RestartGame => "RESTART_GAME",
            Intent::RestartGameYes => "RESTART_GAME_YES",
            Intent::RestartGameNo => "RESTART_GAME_NO",
            Intent::UndoMove => "UNDO_MOVE",
        }
    }

    /// Handled in every phase, ahead of the eligibility table
    pub fn is_phase_independent(self) -> bool {
        matches!(self, Intent::Hello | Intent::Fallback)
    }

    pub fn is_restart_follow_up(self) -> bool {
        matches!(self, Intent::RestartGameYes | Intent::RestartGameNo)
    }

    /// Resolve a classifier identifier
    ///
    /// Accepts the internal name (`MOVE_PIECE`), a display name
    /// (`Move Piece Intent`), a bare classifier id, or a full resource path.
    pub fn resolve(raw: &str) -> Option<Intent> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let last_segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
        if let Some((_, intent)) = KNOWN_INTENT_IDS
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(last_segment))
        {
            return Some(*intent);
        }

        let normalized = last_segment
            .to_ascii_uppercase()
            .replace([' ', '-', '.'], "_");
        let normalized = normalized.strip_suffix("_INTENT").unwrap_or(&normalized);

        match normalized {
            "MOVE_PIECE_FROM" | "MOVE_PIECE_TO" | "MOVE" => Some(Intent::MovePiece),
            "DEFAULT_FALLBACK" => Some(Intent::Fallback),
            "DEFAULT_WELCOME" | "WELCOME" => Some(Intent::Hello),
            "UNDO" => Some(Intent::UndoMove),
            "RESTART" => Some(Intent::RestartGame),
            other => Intent::ALL.into_iter().find(|intent| intent.name() == other),
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_internal_names() {
        for intent in Intent::ALL {
            assert_eq!(Intent::resolve(intent.name()), Some(intent));
        }
    }

    #[test]
    fn test_resolve_display_names() {
        assert_eq!(Intent::resolve("Choose Side Intent"), Some(Intent::ChooseSide));
        assert_eq!(Intent::resolve("move-piece"), Some(Intent::MovePiece));
        assert_eq!(Intent::resolve("Move Piece From"), Some(Intent::MovePiece));
    }

    #[test]
    fn test_resolve_classifier_paths() {
        let path = format!("{}6fafe557-d27b-41e7-bef0-204a87036e2c", INTENT_NAME_BASE);
        assert_eq!(Intent::resolve(&path), Some(Intent::ChooseSide));
        assert_eq!(
            Intent::resolve("67bf1b70-c4f3-44e5-976e-960837acff06"),
            Some(Intent::MovePiece)
        );
    }

    #[test]
    fn test_resolve_unknown() {
        assert_eq!(Intent::resolve(""), None);
        assert_eq!(Intent::resolve("ORDER_PIZZA"), None);
        assert_eq!(
            Intent::resolve("projects/x/agent/intents/00000000-0000"),
            None
        );
    }
}
