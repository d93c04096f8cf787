//! Session module - per-conversation state, persistence and locking
//!
//! # Module Structure
//!
//! - `state` - [`SessionState`], [`Phase`] and the [`SessionField`] names
//! - `store` - The [`SessionStore`] contract with memory and file backends
//! - `lock` - [`SessionLocks`], one async mutex per live session
//! - `error` - Store failures

pub mod error;
pub mod lock;
pub mod state;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use lock::{SessionGuard, SessionLocks};
pub use state::{Phase, SessionField, SessionState};
pub use store::{FileStore, MemoryStore, SessionStore};
