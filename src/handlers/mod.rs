//! Per-intent handlers
//!
//! A handler gets the session draft, the classifier's parameters and the
//! current position, and returns a [`Fulfillment`]. Handlers validate first
//! and mutate the draft only once validation has passed; the dispatcher
//! additionally rolls back phase-relevant fields whenever a handler reports
//! `success=false`.
//!
//! # Module Structure
//!
//! - `moves` - MOVE_PIECE: ownership, legality, application, check/mate
//! - `disambiguation` - Origin resolution from destination and piece type
//! - `lifecycle` - START_GAME, CHOOSE_SIDE, RESTART_GAME(+YES/NO), UNDO_MOVE
//! - `info` - HELLO, FALLBACK, wake-up exchange, HOW_PIECE_MOVES,
//!   POSSIBLE_ACTIONS, BEST_MOVE
//! - `andy` - Andy's own reply move
//! - `error` - [`MoveError`], the user-facing rule violations

pub mod andy;
pub mod disambiguation;
pub mod error;
pub mod info;
pub mod lifecycle;
pub mod moves;

pub use error::{MoveError, MoveResult};

use crate::chess::{Position, RuleOracle};
use crate::recommender::{MoveRecommender, SearchBudget};
use crate::responses::{Phrasebook, ResponseCategory, Slots};

/// Collaborators shared by every handler for one request
pub struct HandlerContext<'a> {
    pub oracle: &'a dyn RuleOracle,
    pub recommender: &'a dyn MoveRecommender,
    pub phrases: &'a Phrasebook,
    pub budget: SearchBudget,
    /// Andy answers each successful user move with its own
    pub andy_replies: bool,
}

impl HandlerContext<'_> {
    pub fn phrase(&self, category: ResponseCategory, slots: &Slots) -> String {
        self.phrases.phrase(category, slots)
    }

    pub fn say(&self, category: ResponseCategory) -> String {
        self.phrases.say(category)
    }
}

/// Outcome of one handler call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fulfillment {
    pub text: String,
    pub success: bool,
    pub position: Position,
}

impl Fulfillment {
    pub fn succeeded(text: String, position: Position) -> Self {
        Self {
            text,
            success: true,
            position,
        }
    }

    pub fn failed(text: String, position: Position) -> Self {
        Self {
            text,
            success: false,
            position,
        }
    }

    /// Render a rule violation, leaving the position as it was
    pub fn rejected(ctx: &HandlerContext<'_>, error: &MoveError, position: &Position) -> Self {
        Self::failed(ctx.phrase(error.category(), &error.slots()), position.clone())
    }

    pub(crate) fn append(&mut self, sentence: &str) {
        if sentence.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(sentence);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by handler tests

    use super::HandlerContext;
    use crate::chess::{ChessMove, Position, ShakmatyOracle};
    use crate::recommender::{
        MoveRecommender, RecommenderError, RecommenderResult, SearchBudget,
    };
    use crate::responses::Phrasebook;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Answers with a fixed move, or fails with a fixed error
    pub struct Scripted(pub RecommenderResult<ChessMove>);

    #[async_trait]
    impl MoveRecommender for Scripted {
        async fn best_move(&self, _: &Position, _: Duration) -> RecommenderResult<ChessMove> {
            self.0.clone()
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    pub fn unavailable() -> Scripted {
        Scripted(Err(RecommenderError::Unavailable("offline".into())))
    }

    pub fn context<'a>(
        oracle: &'a ShakmatyOracle,
        recommender: &'a dyn MoveRecommender,
        phrases: &'a Phrasebook,
        andy_replies: bool,
    ) -> HandlerContext<'a> {
        HandlerContext {
            oracle,
            recommender,
            phrases,
            budget: SearchBudget::default(),
            andy_replies,
        }
    }
}
