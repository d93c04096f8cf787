//! Rule violations a handler reports back to the user
//!
//! None of these are faults. Each maps to a [`ResponseCategory`] and ends
//! the request with `success=false`; they never leave the handler layer.

use crate::chess::{ChessMove, Color, Piece, Square};
use crate::responses::{ResponseCategory, Slots};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// Nothing stands on the origin square
    #[error("No piece on {square}")]
    EmptySquare { square: Square },

    /// Origin holds a piece of the side not on move
    #[error("{square} holds a {} {} but {turn} is to move", .piece.color, .piece.kind)]
    WrongSide {
        square: Square,
        piece: Piece,
        turn: Color,
    },

    #[error("Illegal move {mv}")]
    IllegalMove { mv: ChessMove },

    /// No piece of the side to move can reach the destination
    #[error("No piece can move to {to}")]
    NoLegalSource { to: Square },

    /// Several pieces can reach the destination and nothing singles one out
    #[error("{} pieces can move to {to}", .candidates.len())]
    AmbiguousMove { to: Square, candidates: Vec<Square> },

    #[error("Destination missing for the piece on {from}")]
    MissingDestination { from: Square },

    #[error("Neither origin nor destination given")]
    MissingOrigin,

    #[error("No earlier position to return to")]
    NothingToUndo,
}

/// Result type alias for handler-level move validation
pub type MoveResult<T> = Result<T, MoveError>;

impl MoveError {
    pub fn category(&self) -> ResponseCategory {
        match self {
            MoveError::EmptySquare { .. } => ResponseCategory::EmptySquare,
            MoveError::WrongSide { .. } => ResponseCategory::WrongSide,
            MoveError::IllegalMove { .. } => ResponseCategory::IllegalMove,
            MoveError::NoLegalSource { .. } => ResponseCategory::NoLegalSource,
            MoveError::AmbiguousMove { .. } => ResponseCategory::AmbiguousMove,
            MoveError::MissingDestination { .. } => ResponseCategory::MissingDestination,
            MoveError::MissingOrigin => ResponseCategory::MissingOrigin,
            MoveError::NothingToUndo => ResponseCategory::NothingToUndo,
        }
    }

    pub fn slots(&self) -> Slots {
        match self {
            MoveError::EmptySquare { square }
            | MoveError::WrongSide { square, .. }
            | MoveError::MissingDestination { from: square } => Slots::squares(Some(*square), None),
            MoveError::IllegalMove { mv } => Slots::for_move(mv),
            MoveError::NoLegalSource { to } | MoveError::AmbiguousMove { to, .. } => {
                Slots::squares(None, Some(*to))
            }
            MoveError::MissingOrigin | MoveError::NothingToUndo => Slots::none(),
        }
    }
}
