//! Move Recommender - strongest-move search behind a time budget
//!
//! The fulfillment engine asks for a move in two places: the BEST_MOVE hint
//! and, when enabled, Andy's own reply. Both go through [`recommend_within`],
//! which enforces the deadline regardless of how the implementation behaves.
//!
//! # Implementations
//!
//! | Recommender        | Source of moves              | Typical latency |
//! |--------------------|------------------------------|-----------------|
//! | [`UciEngine`]      | External UCI binary (Stockfish) | budget + process start |
//! | [`MaterialRecommender`] | One-ply material heuristic | < 1ms |
//!
//! A slow or hung engine can never stall a request: the future is dropped at
//! the deadline and the child process is killed with it.

pub mod error;
pub mod material;
pub mod uci;

pub use error::{RecommenderError, RecommenderResult};
pub use material::MaterialRecommender;
pub use uci::UciEngine;

use crate::chess::{ChessMove, Position};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Search for a strong move in a position
#[async_trait]
pub trait MoveRecommender: Send + Sync {
    /// Suggest a move for the side to move, spending at most `budget` thinking
    async fn best_move(&self, position: &Position, budget: Duration)
        -> RecommenderResult<ChessMove>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// Time allowed for a recommender call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBudget {
    /// Thinking time handed to the search
    pub think: Duration,
    /// Extra time allowed for process start-up and I/O before the call is cut off
    pub grace: Duration,
}

impl SearchBudget {
    pub fn deadline(&self) -> Duration {
        self.think + self.grace
    }
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            think: Duration::from_millis(100),
            grace: Duration::from_millis(400),
        }
    }
}

/// Ask `recommender` for a move, failing with [`RecommenderError::Timeout`]
/// once the budget's deadline passes
pub async fn recommend_within(
    recommender: &dyn MoveRecommender,
    position: &Position,
    budget: SearchBudget,
) -> RecommenderResult<ChessMove> {
    let deadline = budget.deadline();
    match tokio::time::timeout(deadline, recommender.best_move(position, budget.think)).await {
        Ok(Ok(mv)) => {
            debug!("[RECOMMENDER] {} suggested {}", recommender.name(), mv);
            Ok(mv)
        }
        Ok(Err(e)) => {
            warn!("[RECOMMENDER] {} failed: {}", recommender.name(), e);
            Err(e)
        }
        Err(_) => {
            warn!(
                "[RECOMMENDER] {} exceeded its {:?} deadline",
                recommender.name(),
                deadline
            );
            Err(RecommenderError::Timeout {
                millis: deadline.as_millis(),
            })
        }
    }
}
