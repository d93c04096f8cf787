//! Resolving "knight to f3" into a single origin square
//!
//! Geometry first: if only one piece of the side to move can reach the
//! destination, that piece moves, whatever type the user named. The stated
//! piece type is only consulted when several pieces qualify. A name that
//! matches none or several of them is reported as ambiguity, the same as no
//! name at all.

use super::error::{MoveError, MoveResult};
use crate::chess::{PieceKind, Position, RuleOracle, Square};

pub fn resolve_origin(
    oracle: &dyn RuleOracle,
    position: &Position,
    to: Square,
    piece: Option<PieceKind>,
) -> MoveResult<Square> {
    let mut candidates: Vec<Square> = oracle
        .pseudo_legal_moves_to(position, to)
        .into_iter()
        .map(|mv| mv.from)
        .collect();
    candidates.dedup();

    match candidates.as_slice() {
        [] => return Err(MoveError::NoLegalSource { to }),
        [only] => return Ok(*only),
        _ => {}
    }

    let Some(kind) = piece else {
        return Err(MoveError::AmbiguousMove { to, candidates });
    };
    let matching: Vec<Square> = candidates
        .iter()
        .copied()
        .filter(|square| oracle.piece_at(position, *square).is_some_and(|p| p.kind == kind))
        .collect();

    match matching.as_slice() {
        [only] => Ok(*only),
        _ => Err(MoveError::AmbiguousMove { to, candidates }),
    }
}
