//! MOVE_PIECE - turning "knight to f3" into a played move
//!
//! # Flow
//!
//! ```text
//! destination? --no--> origin? --no--> MissingOrigin
//!      |                  \--yes--> check owner, remember as pending, MissingDestination
//!      yes
//!      |
//! origin = stated origin | pending origin (no piece named) | disambiguation
//!      |
//! EmptySquare -> WrongSide -> IllegalMove      (fixed order, first failure wins)
//!      |
//! apply, push pre-move position, checkmate => FINISHED, else check remark
//! ```
//!
//! The three ownership/legality checks run in the same order for every
//! parameter combination, so an empty origin square always reports as
//! EmptySquare.

use super::error::{MoveError, MoveResult};
use super::{andy, disambiguation, Fulfillment, HandlerContext};
use crate::chess::{ChessMove, Piece, PieceKind, Position, RuleOracle, Square};
use crate::intent::IntentParams;
use crate::responses::{ResponseCategory, Slots};
use crate::session::SessionState;
use tracing::{debug, info, warn};

pub async fn move_piece(
    ctx: &HandlerContext<'_>,
    state: &mut SessionState,
    params: &IntentParams,
    position: &Position,
) -> Fulfillment {
    // A reply that failed earlier: Andy moves now, the user's request is dropped
    if andy::is_andys_turn(ctx, state, position) {
        info!("[MOVE] Andy still owes a move, playing it first");
        return andy::take_turn(ctx, state, position).await;
    }

    match plan_move(ctx.oracle, state, params, position) {
        Ok(mv) => apply(ctx, state, position, mv).await,
        Err(e) => {
            debug!("[MOVE] Rejected: {}", e);
            Fulfillment::rejected(ctx, &e, position)
        }
    }
}

/// Work out the move the user means and validate it without applying it
///
/// Only `pending_move_origin` is touched here: it is consumed whenever a
/// destination arrives and set when an origin arrives alone.
pub fn plan_move(
    oracle: &dyn RuleOracle,
    state: &mut SessionState,
    params: &IntentParams,
    position: &Position,
) -> MoveResult<ChessMove> {
    let stated_origin = params.origin();
    let stated_kind = params.piece_kind();

    let Some(to) = params.destination() else {
        let from = stated_origin.ok_or(MoveError::MissingOrigin)?;
        check_owner(oracle, position, from)?;
        state.pending_move_origin = Some(from);
        return Err(MoveError::MissingDestination { from });
    };

    let pending = state.pending_move_origin.take();
    let from = match (stated_origin, pending, stated_kind) {
        (Some(from), _, _) => from,
        (None, Some(pending), None) => pending,
        (None, _, kind) => disambiguation::resolve_origin(oracle, position, to, kind)?,
    };

    let mover = check_owner(oracle, position, from)?;
    let mv = ChessMove {
        from,
        to,
        promotion: promotion_for(mover, to, stated_kind),
    };
    if !oracle.is_legal(position, &mv) {
        return Err(MoveError::IllegalMove { mv });
    }
    Ok(mv)
}

fn check_owner(oracle: &dyn RuleOracle, position: &Position, square: Square) -> MoveResult<Piece> {
    let piece = oracle
        .piece_at(position, square)
        .ok_or(MoveError::EmptySquare { square })?;
    let turn = oracle.turn_of(position);
    if piece.color != turn {
        return Err(MoveError::WrongSide {
            square,
            piece,
            turn,
        });
    }
    Ok(piece)
}

/// "pawn to a8 queen" names the promotion; an unnamed one is left to the
/// oracle, which promotes to a queen
fn promotion_for(mover: Piece, to: Square, stated: Option<PieceKind>) -> Option<PieceKind> {
    let last_rank = to.rank() == 0 || to.rank() == 7;
    if mover.kind != PieceKind::Pawn || !last_rank {
        return None;
    }
    stated.filter(|kind| !matches!(kind, PieceKind::Pawn | PieceKind::King))
}

async fn apply(
    ctx: &HandlerContext<'_>,
    state: &mut SessionState,
    position: &Position,
    mv: ChessMove,
) -> Fulfillment {
    let next = match ctx.oracle.apply_move(position, &mv) {
        Ok(next) => next,
        Err(e) => {
            warn!("[MOVE] Validated move {} failed to apply: {}", mv, e);
            return Fulfillment::rejected(ctx, &MoveError::IllegalMove { mv }, position);
        }
    };
    state.position_history.push(position.clone());
    info!("[MOVE] Applied {}", mv);

    let mut reply = Fulfillment::succeeded(
        ctx.phrase(ResponseCategory::MoveSuccess, &Slots::for_move(&mv)),
        next.clone(),
    );

    if ctx.oracle.is_checkmate(&next) {
        state.game_finished = true;
        reply.append(&ctx.say(ResponseCategory::Checkmate));
        info!("[MOVE] Checkmate, game finished");
        return reply;
    }
    if ctx.oracle.is_check(&next) {
        reply.append(&ctx.say(ResponseCategory::Check));
    }

    if ctx.andy_replies {
        let answer = andy::take_turn(ctx, state, &next).await;
        reply.append(&answer.text);
        reply.position = answer.position;
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::{Color, ShakmatyOracle};
    use crate::handlers::testing::{context, unavailable, Scripted};
    use crate::responses::Phrasebook;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn in_progress(side: Color) -> SessionState {
        SessionState {
            game_started: true,
            chosen_side: Some(side),
            ..Default::default()
        }
    }

    fn params(pairs: &[(&str, &str)]) -> IntentParams {
        IntentParams::from_pairs(pairs.iter().copied())
    }

    async fn run(
        state: &mut SessionState,
        p: IntentParams,
        position: &Position,
    ) -> Fulfillment {
        let oracle = ShakmatyOracle::new();
        let phrases = Phrasebook::first();
        let recommender = unavailable();
        let ctx = context(&oracle, &recommender, &phrases, false);
        move_piece(&ctx, state, &p, position).await
    }

    #[tokio::test]
    async fn test_direct_move() {
        let mut state = in_progress(Color::White);
        let start = Position::starting();
        let reply = run(&mut state, params(&[("from", "e2"), ("to", "e4")]), &start).await;

        assert!(reply.success);
        assert_eq!(reply.text, "Okay, moving e2 to e4.");
        assert_eq!(ShakmatyOracle::new().turn_of(&reply.position), Color::Black);
        assert_eq!(state.position_history, vec![start]);
    }

    #[test]
    fn test_empty_square_wins_over_everything() {
        let start = Position::starting();
        let attempts = [
            params(&[("from", "e4"), ("to", "e5")]),
            params(&[("from", "e4")]),
            params(&[("from", "d5"), ("to", "d6"), ("piece", "queen")]),
        ];
        for p in attempts {
            let mut state = in_progress(Color::White);
            let oracle = ShakmatyOracle::new();
            let err = plan_move(&oracle, &mut state, &p, &start).unwrap_err();
            assert!(matches!(err, MoveError::EmptySquare { .. }), "{:?}", err);
        }
    }

    #[tokio::test]
    async fn test_opponent_piece_is_refused() {
        let mut state = in_progress(Color::White);
        let start = Position::starting();
        let reply = run(&mut state, params(&[("from", "e7"), ("to", "e5")]), &start).await;

        assert!(!reply.success);
        assert_eq!(reply.text, "Don't touch my pieces!");
        assert_eq!(reply.position, start);
        assert!(state.position_history.is_empty());
    }

    #[tokio::test]
    async fn test_illegal_move_is_refused() {
        let mut state = in_progress(Color::White);
        let start = Position::starting();
        let reply = run(&mut state, params(&[("from", "e2"), ("to", "e5")]), &start).await;

        assert!(!reply.success);
        assert_eq!(reply.text, "I heard ya, but that move is illegal.");
        assert!(state.position_history.is_empty());
    }

    #[tokio::test]
    async fn test_origin_then_destination() {
        let mut state = in_progress(Color::White);
        let start = Position::starting();

        let first = run(&mut state, params(&[("from", "g1")]), &start).await;
        assert!(!first.success);
        assert_eq!(first.text, "You wanted to move your piece at g1 to where?");
        assert_eq!(state.pending_move_origin, Some(sq("g1")));

        let second = run(&mut state, params(&[("to", "f3")]), &start).await;
        assert!(second.success);
        assert_eq!(second.text, "Okay, moving g1 to f3.");
        assert_eq!(state.pending_move_origin, None);
    }

    #[tokio::test]
    async fn test_piece_name_resolves_origin() {
        let mut state = in_progress(Color::White);
        let reply = run(
            &mut state,
            params(&[("to", "f3"), ("piece", "knight")]),
            &Position::starting(),
        )
        .await;
        assert!(reply.success);
        assert_eq!(reply.text, "Okay, moving g1 to f3.");
    }

    #[tokio::test]
    async fn test_ambiguous_destination() {
        let mut state = in_progress(Color::White);
        let reply = run(&mut state, params(&[("to", "f3")]), &Position::starting()).await;
        assert!(!reply.success);
        assert_eq!(
            reply.text,
            "More than one piece can go to f3. Which one did you mean?"
        );
    }

    #[tokio::test]
    async fn test_nothing_given() {
        let mut state = in_progress(Color::White);
        let reply = run(&mut state, IntentParams::default(), &Position::starting()).await;
        assert!(!reply.success);
        assert_eq!(reply.text, "Which piece did you want to move?");
    }

    #[tokio::test]
    async fn test_checkmate_finishes_game() {
        let oracle = ShakmatyOracle::new();
        let before_mate = oracle
            .parse("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2")
            .unwrap();
        let mut state = in_progress(Color::Black);
        let reply = run(&mut state, params(&[("from", "d8"), ("to", "h4")]), &before_mate).await;

        assert!(reply.success);
        assert_eq!(
            reply.text,
            "Okay, moving d8 to h4. And that puts me in checkmate, you win!"
        );
        assert!(state.game_finished);
    }

    #[tokio::test]
    async fn test_check_remark() {
        let oracle = ShakmatyOracle::new();
        let position = oracle.parse("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let mut state = in_progress(Color::White);
        let reply = run(&mut state, params(&[("from", "a1"), ("to", "a8")]), &position).await;

        assert!(reply.success);
        assert!(reply.text.ends_with("That puts me in check!"));
        assert!(!state.game_finished);
    }

    #[tokio::test]
    async fn test_unnamed_promotion_is_a_queen() {
        let oracle = ShakmatyOracle::new();
        let position = oracle.parse("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mut state = in_progress(Color::White);
        let reply = run(&mut state, params(&[("from", "a7"), ("to", "a8")]), &position).await;

        assert!(reply.success);
        let promoted = oracle.piece_at(&reply.position, sq("a8")).unwrap();
        assert_eq!(promoted.kind, PieceKind::Queen);
    }

    #[tokio::test]
    async fn test_named_promotion() {
        let oracle = ShakmatyOracle::new();
        let position = oracle.parse("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mut state = in_progress(Color::White);
        let p = params(&[("from", "a7"), ("to", "a8"), ("piece", "knight")]);
        let reply = run(&mut state, p, &position).await;

        assert!(reply.success);
        let promoted = oracle.piece_at(&reply.position, sq("a8")).unwrap();
        assert_eq!(promoted.kind, PieceKind::Knight);
    }

    #[tokio::test]
    async fn test_andy_replies_after_user_move() {
        let oracle = ShakmatyOracle::new();
        let phrases = Phrasebook::first();
        let recommender = Scripted(Ok("e7e5".parse().unwrap()));
        let ctx = context(&oracle, &recommender, &phrases, true);
        let mut state = in_progress(Color::White);
        let start = Position::starting();

        let p = params(&[("from", "e2"), ("to", "e4")]);
        let reply = move_piece(&ctx, &mut state, &p, &start).await;

        assert!(reply.success);
        assert_eq!(
            reply.text,
            "Okay, moving e2 to e4. I'll move my pawn at e7 to e5"
        );
        assert_eq!(state.position_history.len(), 2);
        assert_eq!(state.position_history[0], start);
        assert_eq!(oracle.turn_of(&reply.position), Color::White);
    }

    #[tokio::test]
    async fn test_andy_failure_keeps_user_move() {
        let oracle = ShakmatyOracle::new();
        let phrases = Phrasebook::first();
        let recommender = unavailable();
        let ctx = context(&oracle, &recommender, &phrases, true);
        let mut state = in_progress(Color::White);

        let p = params(&[("from", "e2"), ("to", "e4")]);
        let reply = move_piece(&ctx, &mut state, &p, &Position::starting()).await;

        assert!(reply.success);
        assert!(reply.text.starts_with("Okay, moving e2 to e4."));
        assert!(reply.text.ends_with("Give me a moment."));
        assert_eq!(state.position_history.len(), 1);
        assert_eq!(oracle.turn_of(&reply.position), Color::Black);
    }
}
