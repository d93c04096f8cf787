//! Conversational and informational handlers
//!
//! None of these touch game state. BEST_MOVE is the only one with an
//! external call; a recommender failure turns into an apology.

use super::{Fulfillment, HandlerContext};
use crate::chess::Position;
use crate::intent::IntentParams;
use crate::recommender::recommend_within;
use crate::responses::{ResponseCategory, Slots};
use tracing::warn;

pub fn hello(ctx: &HandlerContext<'_>, position: &Position) -> Fulfillment {
    Fulfillment::succeeded(ctx.say(ResponseCategory::Hello), position.clone())
}

/// Fallback phrasing; `success` is true only when FALLBACK was the intent asked for
pub fn fallback(ctx: &HandlerContext<'_>, position: &Position, success: bool) -> Fulfillment {
    Fulfillment {
        text: ctx.say(ResponseCategory::Fallback),
        success,
        position: position.clone(),
    }
}

pub fn wake_up(ctx: &HandlerContext<'_>, category: ResponseCategory, position: &Position) -> Fulfillment {
    Fulfillment::succeeded(ctx.say(category), position.clone())
}

pub fn how_piece_moves(
    ctx: &HandlerContext<'_>,
    params: &IntentParams,
    position: &Position,
) -> Fulfillment {
    match params.piece_kind() {
        Some(kind) => Fulfillment::succeeded(
            ctx.say(ResponseCategory::HowPieceMoves(kind)),
            position.clone(),
        ),
        None => Fulfillment::failed(ctx.say(ResponseCategory::UnknownPiece), position.clone()),
    }
}

pub fn possible_actions(ctx: &HandlerContext<'_>, position: &Position) -> Fulfillment {
    Fulfillment::succeeded(ctx.say(ResponseCategory::PossibleActions), position.clone())
}

/// BEST_MOVE: describe the recommender's move without playing it
pub async fn best_move(ctx: &HandlerContext<'_>, position: &Position) -> Fulfillment {
    let suggestion = recommend_within(ctx.recommender, position, ctx.budget)
        .await
        .map(|mv| (mv, ctx.oracle.piece_at(position, mv.from)));

    match suggestion {
        Ok((mv, Some(piece))) => Fulfillment::succeeded(
            ctx.phrase(
                ResponseCategory::BestMove,
                &Slots::for_move(&mv).with_piece(piece.kind),
            ),
            position.clone(),
        ),
        Ok((mv, None)) => {
            warn!("[RECOMMENDER] Suggested {} starts on an empty square", mv);
            Fulfillment::failed(ctx.say(ResponseCategory::RecommenderApology), position.clone())
        }
        Err(_) => {
            Fulfillment::failed(ctx.say(ResponseCategory::RecommenderApology), position.clone())
        }
    }
}
