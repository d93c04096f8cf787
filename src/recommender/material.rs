//! Material recommender - one-ply fallback when no UCI engine is installed
//!
//! Scores every legal move by what it wins and what it leaves hanging:
//!
//! - Checkmate beats everything
//! - Captured material (and promotion gain) counts in full
//! - Moving onto a square the opponent can take back costs the mover's value
//! - Giving check earns a small bonus
//!
//! Ties keep the oracle's move order, so the result is deterministic.

use super::error::{RecommenderError, RecommenderResult};
use super::MoveRecommender;
use crate::chess::{ChessMove, PieceKind, Position, RuleOracle};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

const MATE_SCORE: i32 = 100_000;
const CHECK_BONUS: i32 = 50;

/// Greedy material-counting recommender built on the rule oracle
#[derive(Clone)]
pub struct MaterialRecommender {
    oracle: Arc<dyn RuleOracle>,
}

impl MaterialRecommender {
    pub fn new(oracle: Arc<dyn RuleOracle>) -> Self {
        Self { oracle }
    }

    fn score(&self, position: &Position, mv: &ChessMove) -> Option<i32> {
        let mover = self.oracle.piece_at(position, mv.from)?;
        let after = self.oracle.apply_move(position, mv).ok()?;

        if self.oracle.is_checkmate(&after) {
            return Some(MATE_SCORE);
        }

        let mut score = self
            .oracle
            .piece_at(position, mv.to)
            .map(|captured| captured.kind.value())
            .unwrap_or(0);

        let landed = mv.promotion.unwrap_or(if mover.kind == PieceKind::Pawn
            && (mv.to.rank() == 0 || mv.to.rank() == 7)
        {
            PieceKind::Queen
        } else {
            mover.kind
        });
        score += landed.value() - mover.kind.value();

        if !self.oracle.pseudo_legal_moves_to(&after, mv.to).is_empty() {
            score -= landed.value();
        }
        if self.oracle.is_check(&after) {
            score += CHECK_BONUS;
        }
        Some(score)
    }
}

#[async_trait]
impl MoveRecommender for MaterialRecommender {
    async fn best_move(
        &self,
        position: &Position,
        _budget: Duration,
    ) -> RecommenderResult<ChessMove> {
        let mut best: Option<(i32, ChessMove)> = None;
        for mv in self.oracle.legal_moves(position) {
            let Some(score) = self.score(position, &mv) else {
                continue;
            };
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, mv));
            }
        }
        best.map(|(_, mv)| mv).ok_or(RecommenderError::NoMove)
    }

    fn name(&self) -> &str {
        "material"
    }
}
