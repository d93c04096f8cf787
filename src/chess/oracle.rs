//! Chess Rule Oracle - the single authority on chess rules
//!
//! The fulfillment engine never computes legality itself. Every question
//! about a position (whose turn, what stands on a square, which moves reach a
//! square, check and checkmate) goes through [`RuleOracle`].
//!
//! # Contract
//!
//! - [`RuleOracle::parse`] is the only entry point for untrusted encodings. It
//!   validates and canonicalizes the string.
//! - Every other method may assume its [`Position`] came out of `parse` or
//!   `apply_move`. Implementations must not panic on bad input anyway; they
//!   answer as if the board were empty and log the problem.
//!
//! # Implementations
//!
//! [`ShakmatyOracle`] backs the trait with the `shakmaty` rules library,
//! round-tripping positions through FEN on every call.

use super::error::{OracleError, OracleResult};
use super::types::{ChessMove, Color, Piece, PieceKind, Position, Square};
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{Board, CastlingMode, Chess, EnPassantMode, Position as _, Role};
use tracing::error;

/// Narrow interface to chess rule computation
pub trait RuleOracle: Send + Sync {
    /// Validate and canonicalize a position encoding
    fn parse(&self, encoded: &str) -> OracleResult<Position>;

    /// Whether `mv` is in the legal-move set of `position`
    ///
    /// A move onto the last rank without a promotion piece is read as a
    /// queen promotion.
    fn is_legal(&self, position: &Position, mv: &ChessMove) -> bool;

    /// All legal moves of the side to move
    fn legal_moves(&self, position: &Position) -> Vec<ChessMove>;

    /// Moves of the side to move whose destination is `square`, ignoring
    /// whether they leave the own king in check
    ///
    /// One move per origin square; underpromotions are not listed separately.
    fn pseudo_legal_moves_to(&self, position: &Position, square: Square) -> Vec<ChessMove>;

    fn piece_at(&self, position: &Position, square: Square) -> Option<Piece>;

    fn turn_of(&self, position: &Position) -> Color;

    fn is_check(&self, position: &Position) -> bool;

    fn is_checkmate(&self, position: &Position) -> bool;

    /// Play `mv` and return the resulting position
    fn apply_move(&self, position: &Position, mv: &ChessMove) -> OracleResult<Position>;
}

/// [`RuleOracle`] backed by `shakmaty`
#[derive(Debug, Default, Clone, Copy)]
pub struct ShakmatyOracle;

impl ShakmatyOracle {
    pub fn new() -> Self {
        Self
    }

    fn load(encoded: &str) -> OracleResult<Chess> {
        let fen = encoded
            .trim()
            .parse::<Fen>()
            .map_err(|e| OracleError::InvalidPosition {
                encoded: encoded.to_string(),
                reason: e.to_string(),
            })?;
        fen.into_position(CastlingMode::Standard)
            .map_err(|e| OracleError::InvalidPosition {
                encoded: encoded.to_string(),
                reason: e.to_string(),
            })
    }

    /// Load a position that is expected to be valid already
    fn board(position: &Position) -> Option<Chess> {
        match Self::load(position.as_str()) {
            Ok(chess) => Some(chess),
            Err(e) => {
                error!("[ORACLE] Unvalidated position reached the oracle: {}", e);
                None
            }
        }
    }

    fn encode(chess: Chess) -> Position {
        Position::new(Fen::from_position(chess, EnPassantMode::Legal).to_string())
    }

    /// Legal moves paired with their standard from/to form
    fn moves_with_notation(chess: &Chess) -> Vec<(shakmaty::Move, ChessMove)> {
        chess
            .legal_moves()
            .into_iter()
            .filter_map(|m| {
                let notation = to_chess_move(&UciMove::from_move(&m, CastlingMode::Standard))?;
                Some((m, notation))
            })
            .collect()
    }

    fn find_legal(chess: &Chess, mv: &ChessMove) -> Option<shakmaty::Move> {
        Self::moves_with_notation(chess)
            .into_iter()
            .find(|(_, candidate)| {
                candidate.from == mv.from
                    && candidate.to == mv.to
                    && (candidate.promotion == mv.promotion
                        || (mv.promotion.is_none() && candidate.promotion == Some(PieceKind::Queen)))
            })
            .map(|(m, _)| m)
    }
}

impl RuleOracle for ShakmatyOracle {
    fn parse(&self, encoded: &str) -> OracleResult<Position> {
        Self::load(encoded).map(Self::encode)
    }

    fn is_legal(&self, position: &Position, mv: &ChessMove) -> bool {
        Self::board(position)
            .map(|chess| Self::find_legal(&chess, mv).is_some())
            .unwrap_or(false)
    }

    fn legal_moves(&self, position: &Position) -> Vec<ChessMove> {
        Self::board(position)
            .map(|chess| {
                Self::moves_with_notation(&chess)
                    .into_iter()
                    .map(|(_, notation)| notation)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn pseudo_legal_moves_to(&self, position: &Position, square: Square) -> Vec<ChessMove> {
        let (Some(chess), Some(target)) = (Self::board(position), to_shakmaty_square(square))
        else {
            return Vec::new();
        };
        let board = chess.board();
        let turn = chess.turn();
        let mut origins: Vec<Square> = Vec::new();

        let occupant = board.color_at(target);
        if occupant != Some(turn) {
            for origin in board.attacks_to(target, turn, board.occupied()) {
                // Pawns only move diagonally when capturing
                if occupant.is_none() && board.role_at(origin) == Some(Role::Pawn) {
                    continue;
                }
                origins.extend(from_shakmaty_square(origin));
            }
            if occupant.is_none() {
                origins.extend(pawn_push_origin(board, turn, square));
            }
        }

        // Castling and en passant are taken from legal generation
        for (_, mv) in Self::moves_with_notation(&chess) {
            if mv.to == square {
                origins.push(mv.from);
            }
        }

        let mut moves: Vec<ChessMove> = Vec::new();
        for from in origins {
            if !moves.iter().any(|mv| mv.from == from) {
                moves.push(ChessMove::new(from, square));
            }
        }
        moves
    }

    fn piece_at(&self, position: &Position, square: Square) -> Option<Piece> {
        let chess = Self::board(position)?;
        let sq = to_shakmaty_square(square)?;
        chess.board().piece_at(sq).map(|piece| Piece {
            color: from_shakmaty_color(piece.color),
            kind: from_role(piece.role),
        })
    }

    fn turn_of(&self, position: &Position) -> Color {
        Self::board(position)
            .map(|chess| from_shakmaty_color(chess.turn()))
            .unwrap_or(Color::White)
    }

    fn is_check(&self, position: &Position) -> bool {
        Self::board(position)
            .map(|chess| chess.is_check())
            .unwrap_or(false)
    }

    fn is_checkmate(&self, position: &Position) -> bool {
        Self::board(position)
            .map(|chess| chess.is_checkmate())
            .unwrap_or(false)
    }

    fn apply_move(&self, position: &Position, mv: &ChessMove) -> OracleResult<Position> {
        let mut chess = Self::load(position.as_str())?;
        let legal =
            Self::find_legal(&chess, mv).ok_or_else(|| OracleError::InvalidMove(mv.to_string()))?;
        chess.play_unchecked(&legal);
        Ok(Self::encode(chess))
    }
}

/// The pawn of `turn` that can push straight onto the empty square `to`
fn pawn_push_origin(board: &Board, turn: shakmaty::Color, to: Square) -> Option<Square> {
    let (step, double_push_rank) = match turn {
        shakmaty::Color::White => (-1, 1),
        shakmaty::Color::Black => (1, 6),
    };
    let behind = |sq: Square| Square::new(sq.file(), sq.rank().checked_add_signed(step)?);
    let own_pawn = |sq: Square| {
        to_shakmaty_square(sq).and_then(|s| board.piece_at(s))
            == Some(shakmaty::Piece {
                color: turn,
                role: Role::Pawn,
            })
    };
    let is_empty = |sq: Square| to_shakmaty_square(sq).is_some_and(|s| board.piece_at(s).is_none());

    let one = behind(to)?;
    if own_pawn(one) {
        return Some(one);
    }
    let two = behind(one).filter(|two| two.rank() == double_push_rank)?;
    (is_empty(one) && own_pawn(two)).then_some(two)
}

fn to_shakmaty_square(square: Square) -> Option<shakmaty::Square> {
    square.to_string().parse().ok()
}

fn from_shakmaty_square(square: shakmaty::Square) -> Option<Square> {
    square.to_string().parse().ok()
}

fn from_shakmaty_color(color: shakmaty::Color) -> Color {
    match color {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}

fn from_role(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

fn to_chess_move(uci: &UciMove) -> Option<ChessMove> {
    match uci {
        UciMove::Normal {
            from,
            to,
            promotion,
        } => Some(ChessMove {
            from: from_shakmaty_square(*from)?,
            to: from_shakmaty_square(*to)?,
            promotion: promotion.map(from_role),
        }),
        _ => None,
    }
}
