//! Andy - fulfillment engine for a voice-driven chess opponent
//!
//! An utterance arrives already classified (intent id + parameters) together
//! with the board the client is showing. [`Fulfiller::fulfill`] decides what
//! to do for the session's current phase, validates moves through the rule
//! oracle, updates the session record, and answers with a sentence and the
//! resulting board.
//!
//! # Module Structure
//!
//! - `chess` - Vocabulary types and the [`RuleOracle`](chess::RuleOracle)
//! - `recommender` - Best-move search behind a time budget
//! - `session` - Session record, stores and per-session locking
//! - `intent` - Intent vocabulary, parameters, eligibility table, classifier seam
//! - `responses` - Phrase templates and variant picking
//! - `handlers` - One handler per intent
//! - `dispatcher` - [`Fulfiller`], the entry point
//! - `config` - Layered configuration and collaborator wiring

pub mod chess;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod intent;
pub mod recommender;
pub mod responses;
pub mod session;

pub use config::AndyConfig;
pub use dispatcher::{EngineOptions, Fulfiller, FulfillmentInfo, FulfillmentReply};
pub use error::{FulfillError, FulfillResult};
pub use intent::{Intent, IntentParams};
