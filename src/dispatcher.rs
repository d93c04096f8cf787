//! Fulfillment dispatcher - the engine's single entry point
//!
//! [`Fulfiller::fulfill`] takes one classified utterance for one session and
//! produces Andy's reply plus the resulting board.
//!
//! # Request Flow
//!
//! 1. Reject an empty session id, parse the position (empty means the
//!    standard starting position)
//! 2. Take the session's lock; it is held until the reply is built
//! 3. Load the session record and keep a snapshot of it
//! 4. Resolve the intent id; unknown ids become FALLBACK
//! 5. FALLBACK and HELLO run in every phase. Anything else must appear in
//!    the eligibility table for the current phase, or the request is answered
//!    as FALLBACK with `success=false`
//! 6. Run exactly one handler against a draft of the record
//! 7. If the handler failed, restore the phase-relevant fields from the
//!    snapshot, then write back only the fields that changed
//!
//! The dispatcher never changes the board itself; only handlers do.

use crate::chess::{Position, RuleOracle};
use crate::error::{FulfillError, FulfillResult};
use crate::handlers::{info as info_handlers, lifecycle, moves, Fulfillment, HandlerContext};
use crate::intent::{is_eligible, Intent, IntentParams};
use crate::recommender::{MoveRecommender, SearchBudget};
use crate::responses::{Phrasebook, ResponseCategory};
use crate::session::{SessionLocks, SessionState, SessionStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Intent name and outcome reported with every reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentInfo {
    pub intent_name: String,
    pub success: bool,
}

/// What `fulfill` hands back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentReply {
    pub response_text: String,
    pub fulfillment_info: FulfillmentInfo,
    pub board_str: String,
}

/// Tunables that are not collaborators
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    pub budget: SearchBudget,
    pub andy_replies: bool,
}

/// The fulfillment engine
#[derive(Clone)]
pub struct Fulfiller {
    oracle: Arc<dyn RuleOracle>,
    recommender: Arc<dyn MoveRecommender>,
    store: Arc<dyn SessionStore>,
    phrases: Phrasebook,
    locks: SessionLocks,
    options: EngineOptions,
}

impl Fulfiller {
    pub fn new(
        oracle: Arc<dyn RuleOracle>,
        recommender: Arc<dyn MoveRecommender>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            oracle,
            recommender,
            store,
            phrases: Phrasebook::random(),
            locks: SessionLocks::new(),
            options: EngineOptions::default(),
        }
    }

    pub fn with_phrasebook(mut self, phrases: Phrasebook) -> Self {
        self.phrases = phrases;
        self
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn recommender_name(&self) -> &str {
        self.recommender.name()
    }

    /// Sessions with a request currently in flight
    pub fn active_sessions(&self) -> usize {
        self.locks.active()
    }

    /// Fulfill one classified utterance
    pub async fn fulfill(
        &self,
        session_id: &str,
        position: &str,
        intent_id: &str,
        params: IntentParams,
    ) -> FulfillResult<FulfillmentReply> {
        if session_id.trim().is_empty() {
            return Err(FulfillError::EmptySessionId);
        }
        let position = if position.trim().is_empty() {
            Position::starting()
        } else {
            self.oracle.parse(position)?
        };

        let _guard = self.locks.acquire(session_id).await;

        let before = SessionState::load(self.store.as_ref(), session_id).await?;
        let mut state = before.clone();
        let phase = state.phase();

        let requested = Intent::resolve(intent_id).unwrap_or_else(|| {
            debug!("[DISPATCH] Unknown intent id '{}', treating as FALLBACK", intent_id);
            Intent::Fallback
        });

        let ctx = HandlerContext {
            oracle: self.oracle.as_ref(),
            recommender: self.recommender.as_ref(),
            phrases: &self.phrases,
            budget: self.options.budget,
            andy_replies: self.options.andy_replies,
        };

        let (intent, outcome) = if requested.is_phase_independent() || is_eligible(phase, requested) {
            if !params.is_empty() {
                state.last_fulfillment_params = Some(params.snapshot());
            }
            let outcome = run_handler(&ctx, requested, &mut state, &params, &position).await;
            (requested, outcome)
        } else {
            debug!("[DISPATCH] {} is not available while {}", requested, phase);
            (Intent::Fallback, info_handlers::fallback(&ctx, &position, false))
        };

        if !matches!(
            intent,
            Intent::RestartGame | Intent::RestartGameYes | Intent::RestartGameNo
        ) {
            state.restart_requested = false;
        }
        if !outcome.success {
            state.restore_phase_fields(&before);
        }

        let written = state.save_changes(&before, self.store.as_ref(), session_id).await;
        let written = written.inspect_err(|e| {
            warn!("[STORE] Could not persist session {}: {}", session_id, e);
        })?;

        info!(
            "[DISPATCH] session={} intent={} phase={} -> {} success={} ({} fields written)",
            session_id,
            intent,
            phase,
            state.phase(),
            outcome.success,
            written
        );

        Ok(FulfillmentReply {
            response_text: outcome.text,
            fulfillment_info: FulfillmentInfo {
                intent_name: intent.name().to_string(),
                success: outcome.success,
            },
            board_str: outcome.position.into_string(),
        })
    }
}

async fn run_handler(
    ctx: &HandlerContext<'_>,
    intent: Intent,
    state: &mut SessionState,
    params: &IntentParams,
    position: &Position,
) -> Fulfillment {
    match intent {
        Intent::Hello => info_handlers::hello(ctx, position),
        Intent::Fallback => info_handlers::fallback(ctx, position, true),
        Intent::WakeUpPrompt => info_handlers::wake_up(ctx, ResponseCategory::WakeUpPrompt, position),
        Intent::WakeUpYes => info_handlers::wake_up(ctx, ResponseCategory::WakeUpYes, position),
        Intent::WakeUpNo => info_handlers::wake_up(ctx, ResponseCategory::WakeUpNo, position),
        Intent::StartGame => lifecycle::start_game(ctx, state, params, position).await,
        Intent::ChooseSide => lifecycle::choose_side(ctx, state, params, position).await,
        Intent::MovePiece => moves::move_piece(ctx, state, params, position).await,
        Intent::HowPieceMoves => info_handlers::how_piece_moves(ctx, params, position),
        Intent::BestMove => info_handlers::best_move(ctx, position).await,
        Intent::PossibleActions => info_handlers::possible_actions(ctx, position),
        Intent::RestartGame => lifecycle::restart_game(ctx, state, position),
        Intent::RestartGameYes => lifecycle::restart_yes(ctx, state, position),
        Intent::RestartGameNo => lifecycle::restart_no(ctx, state, position),
        Intent::UndoMove => lifecycle::undo_move(ctx, state, position),
    }
}

impl std::fmt::Debug for Fulfiller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fulfiller")
            .field("recommender", &self.recommender.name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
