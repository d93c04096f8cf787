//! Chess module - rule authority and vocabulary
//!
//! Everything the fulfillment engine knows about chess lives behind the
//! [`RuleOracle`] trait. Handlers ask questions; they never look inside a
//! position encoding.
//!
//! # Module Structure
//!
//! - `types` - Squares, colors, piece kinds, moves and the opaque [`Position`]
//! - `oracle` - The [`RuleOracle`] trait and its `shakmaty` implementation
//! - `error` - Notation and position parse errors

pub mod error;
pub mod oracle;
pub mod types;

pub use error::{OracleError, OracleResult};
pub use oracle::{RuleOracle, ShakmatyOracle};
pub use types::{ChessMove, Color, Piece, PieceKind, Position, Square, STARTING_FEN};
