//! Game lifecycle handlers
//!
//! ```text
//! START_GAME / CHOOSE_SIDE   NOT_STARTED -> IN_PROGRESS once a side is known
//! RESTART_GAME               asks for confirmation, sets restart_requested
//! RESTART_GAME_YES           back to NOT_STARTED defaults, fresh board
//! RESTART_GAME_NO            drops the request, nothing else changes
//! UNDO_MOVE                  pops position_history
//! ```

use super::{andy, Fulfillment, HandlerContext, MoveError};
use crate::chess::Position;
use crate::intent::IntentParams;
use crate::responses::{ResponseCategory, Slots};
use crate::session::SessionState;
use tracing::{debug, info};

/// START_GAME: a stated side starts the game, otherwise ask for one
pub async fn start_game(
    ctx: &HandlerContext<'_>,
    state: &mut SessionState,
    params: &IntentParams,
    position: &Position,
) -> Fulfillment {
    if params.color().is_some() {
        return choose_side(ctx, state, params, position).await;
    }
    Fulfillment::succeeded(ctx.say(ResponseCategory::SidePrompt), position.clone())
}

/// CHOOSE_SIDE: fix the user's color and start the game on the given board
pub async fn choose_side(
    ctx: &HandlerContext<'_>,
    state: &mut SessionState,
    params: &IntentParams,
    position: &Position,
) -> Fulfillment {
    let Some(side) = params.color() else {
        debug!("[DISPATCH] CHOOSE_SIDE without a recognizable side");
        return Fulfillment::failed(ctx.say(ResponseCategory::SidePrompt), position.clone());
    };

    state.game_started = true;
    state.game_finished = false;
    state.chosen_side = Some(side);
    state.pending_move_origin = None;
    state.position_history.clear();
    info!("[DISPATCH] Game started, user plays {}", side);

    let mut reply = Fulfillment::succeeded(
        ctx.phrase(ResponseCategory::SideChosen, &Slots::side(side)),
        position.clone(),
    );

    if andy::is_andys_turn(ctx, state, position) {
        let opening = andy::take_turn(ctx, state, position).await;
        reply.append(&opening.text);
        reply.position = opening.position;
    }
    reply
}

pub fn restart_game(
    ctx: &HandlerContext<'_>,
    state: &mut SessionState,
    position: &Position,
) -> Fulfillment {
    state.restart_requested = true;
    Fulfillment::succeeded(ctx.say(ResponseCategory::RestartPrompt), position.clone())
}

pub fn restart_yes(
    ctx: &HandlerContext<'_>,
    state: &mut SessionState,
    position: &Position,
) -> Fulfillment {
    if !state.restart_requested {
        return Fulfillment::failed(ctx.say(ResponseCategory::NoRestartPending), position.clone());
    }
    state.reset();
    info!("[DISPATCH] Session reset by restart");
    Fulfillment::succeeded(ctx.say(ResponseCategory::RestartConfirmed), Position::starting())
}

pub fn restart_no(
    ctx: &HandlerContext<'_>,
    state: &mut SessionState,
    position: &Position,
) -> Fulfillment {
    if !state.restart_requested {
        return Fulfillment::failed(ctx.say(ResponseCategory::NoRestartPending), position.clone());
    }
    state.restart_requested = false;
    Fulfillment::succeeded(ctx.say(ResponseCategory::RestartCancelled), position.clone())
}

/// UNDO_MOVE: the previous position becomes current
pub fn undo_move(
    ctx: &HandlerContext<'_>,
    state: &mut SessionState,
    position: &Position,
) -> Fulfillment {
    let Some(previous) = state.position_history.pop() else {
        debug!("[UNDO] History is empty");
        return Fulfillment::rejected(ctx, &MoveError::NothingToUndo, position);
    };
    state.pending_move_origin = None;
    info!("[UNDO] Restored {}, {} left", previous, state.position_history.len());
    Fulfillment::succeeded(ctx.say(ResponseCategory::UndoSuccess), previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::{Color, RuleOracle, ShakmatyOracle};
    use crate::handlers::testing::{context, unavailable, Scripted};
    use crate::responses::Phrasebook;

    fn side(name: &str) -> IntentParams {
        IntentParams::from_pairs([("BoardSide", name)])
    }

    #[tokio::test]
    async fn test_choose_side_starts_game() {
        let oracle = ShakmatyOracle::new();
        let phrases = Phrasebook::first();
        let recommender = unavailable();
        let ctx = context(&oracle, &recommender, &phrases, false);
        let mut state = SessionState::default();

        let reply = choose_side(&ctx, &mut state, &side("white"), &Position::starting()).await;
        assert!(reply.success);
        assert_eq!(reply.text, "Great, you'll play white side then!");
        assert!(state.game_started);
        assert_eq!(state.chosen_side, Some(Color::White));
    }

    #[tokio::test]
    async fn test_choose_side_needs_a_side() {
        let oracle = ShakmatyOracle::new();
        let phrases = Phrasebook::first();
        let recommender = unavailable();
        let ctx = context(&oracle, &recommender, &phrases, false);
        let mut state = SessionState::default();

        let reply = choose_side(&ctx, &mut state, &side("purple"), &Position::starting()).await;
        assert!(!reply.success);
        assert_eq!(state, SessionState::default());
    }

    #[tokio::test]
    async fn test_start_game_prompts_without_side() {
        let oracle = ShakmatyOracle::new();
        let phrases = Phrasebook::first();
        let recommender = unavailable();
        let ctx = context(&oracle, &recommender, &phrases, false);
        let mut state = SessionState::default();

        let reply = start_game(&ctx, &mut state, &IntentParams::default(), &Position::starting()).await;
        assert!(reply.success);
        assert_eq!(reply.text, "Which side would you like to play, white or black?");
        assert!(!state.game_started);
    }

    #[tokio::test]
    async fn test_andy_opens_for_black() {
        let oracle = ShakmatyOracle::new();
        let phrases = Phrasebook::first();
        let recommender = Scripted(Ok("d2d4".parse().unwrap()));
        let ctx = context(&oracle, &recommender, &phrases, true);
        let mut state = SessionState::default();

        let reply = choose_side(&ctx, &mut state, &side("black"), &Position::starting()).await;
        assert!(reply.success);
        assert_eq!(
            reply.text,
            "Great, you'll play black side then! I'll move my pawn at d2 to d4"
        );
        assert_eq!(oracle.turn_of(&reply.position), Color::Black);
        assert_eq!(state.position_history.len(), 1);
    }

    #[test]
    fn test_restart_confirmation() {
        let oracle = ShakmatyOracle::new();
        let phrases = Phrasebook::first();
        let recommender = unavailable();
        let ctx = context(&oracle, &recommender, &phrases, false);
        let position = oracle
            .apply_move(&Position::starting(), &"e2e4".parse().unwrap())
            .unwrap();
        let mut state = SessionState {
            game_started: true,
            chosen_side: Some(Color::White),
            position_history: vec![Position::starting()],
            ..Default::default()
        };

        assert!(!restart_yes(&ctx, &mut state, &position).success);
        assert!(restart_game(&ctx, &mut state, &position).success);
        assert!(state.restart_requested);

        let reply = restart_yes(&ctx, &mut state, &position);
        assert!(reply.success);
        assert_eq!(reply.position, Position::starting());
        assert_eq!(state, SessionState::default());
    }

    #[test]
    fn test_restart_declined() {
        let oracle = ShakmatyOracle::new();
        let phrases = Phrasebook::first();
        let recommender = unavailable();
        let ctx = context(&oracle, &recommender, &phrases, false);
        let position = Position::starting();
        let before = SessionState {
            game_started: true,
            chosen_side: Some(Color::Black),
            ..Default::default()
        };
        let mut state = before.clone();

        restart_game(&ctx, &mut state, &position);
        let reply = restart_no(&ctx, &mut state, &position);
        assert!(reply.success);
        assert_eq!(reply.text, "Okay, let's keep playing!");
        assert_eq!(state, before);
    }

    #[test]
    fn test_undo() {
        let oracle = ShakmatyOracle::new();
        let phrases = Phrasebook::first();
        let recommender = unavailable();
        let ctx = context(&oracle, &recommender, &phrases, false);
        let start = Position::starting();
        let after = oracle.apply_move(&start, &"g1f3".parse().unwrap()).unwrap();
        let mut state = SessionState {
            game_started: true,
            position_history: vec![start.clone()],
            ..Default::default()
        };

        let reply = undo_move(&ctx, &mut state, &after);
        assert!(reply.success);
        assert_eq!(reply.position, start);
        assert!(state.position_history.is_empty());

        let again = undo_move(&ctx, &mut state, &start);
        assert!(!again.success);
        assert_eq!(again.text, "There's no move to take back yet.");
        assert_eq!(again.position, start);
    }
}
