//! Andy's own move
//!
//! Andy asks the recommender for the side to move, plays the answer and
//! describes it. The position Andy moves from is pushed onto the history, so
//! an UNDO_MOVE takes Andy's move back before the user's.

use super::{Fulfillment, HandlerContext};
use crate::chess::{ChessMove, Position};
use crate::recommender::recommend_within;
use crate::responses::{ResponseCategory, Slots};
use crate::session::SessionState;
use tracing::{info, warn};

/// Andy plays the other side and it is that side's turn
pub fn is_andys_turn(ctx: &HandlerContext<'_>, state: &SessionState, position: &Position) -> bool {
    ctx.andy_replies
        && state
            .chosen_side
            .is_some_and(|side| ctx.oracle.turn_of(position) != side)
}

/// Play Andy's move from `position`
///
/// On any recommender failure the position is returned unchanged with an
/// apology and `success=false`.
pub async fn take_turn(
    ctx: &HandlerContext<'_>,
    state: &mut SessionState,
    position: &Position,
) -> Fulfillment {
    let mv = match recommend_within(ctx.recommender, position, ctx.budget).await {
        Ok(mv) => mv,
        Err(e) => {
            warn!("[MOVE] Andy could not pick a move: {}", e);
            return Fulfillment::failed(ctx.say(ResponseCategory::AndyStuck), position.clone());
        }
    };

    match play(ctx, state, position, mv) {
        Some(reply) => reply,
        None => {
            warn!("[MOVE] Recommender suggested {} which cannot be played", mv);
            Fulfillment::failed(ctx.say(ResponseCategory::AndyStuck), position.clone())
        }
    }
}

fn play(
    ctx: &HandlerContext<'_>,
    state: &mut SessionState,
    position: &Position,
    mv: ChessMove,
) -> Option<Fulfillment> {
    let piece = ctx.oracle.piece_at(position, mv.from)?;
    let next = ctx.oracle.apply_move(position, &mv).ok()?;
    state.position_history.push(position.clone());

    let category = if ctx.oracle.is_checkmate(&next) {
        state.game_finished = true;
        ResponseCategory::AndyCheckmate
    } else if ctx.oracle.is_check(&next) {
        ResponseCategory::AndyCheck
    } else {
        ResponseCategory::AndyMove
    };
    info!("[MOVE] Andy plays {} ({})", mv, category_label(category));

    let slots = Slots::for_move(&mv).with_piece(piece.kind);
    Some(Fulfillment::succeeded(ctx.phrase(category, &slots), next))
}

fn category_label(category: ResponseCategory) -> &'static str {
    match category {
        ResponseCategory::AndyCheckmate => "mate",
        ResponseCategory::AndyCheck => "check",
        _ => "quiet",
    }
}
