//! Per-session game state
//!
//! [`SessionState`] is the typed view of one conversation's record in the
//! session store. The dispatcher loads it at the start of a request, hands a
//! mutable draft to exactly one handler, and writes back only the fields
//! that changed.
//!
//! # Lifecycle
//!
//! ```text
//! NOT_STARTED --(CHOOSE_SIDE ok)--> IN_PROGRESS --(checkmate)--> FINISHED
//!      ^                                 |
//!      +-------(RESTART_GAME_YES)--------+
//! ```
//!
//! A session nobody has written yet loads as all-defaults, which reads as
//! NOT_STARTED.

use super::error::{StoreError, StoreResult};
use super::store::SessionStore;
use crate::chess::{Color, Position, Square};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Coarse lifecycle stage of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    NotStarted,
    InProgress,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::NotStarted => "NOT_STARTED",
            Phase::InProgress => "IN_PROGRESS",
            Phase::Finished => "FINISHED",
        })
    }
}

/// Named fields of the session record, as understood by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionField {
    GameStarted,
    GameFinished,
    ChosenSide,
    PendingMoveOrigin,
    LastFulfillmentParams,
    PositionHistory,
    RestartRequested,
}

impl SessionField {
    pub const ALL: [SessionField; 7] = [
        SessionField::GameStarted,
        SessionField::GameFinished,
        SessionField::ChosenSide,
        SessionField::PendingMoveOrigin,
        SessionField::LastFulfillmentParams,
        SessionField::PositionHistory,
        SessionField::RestartRequested,
    ];

    /// Key used by the store
    pub fn as_str(self) -> &'static str {
        match self {
            SessionField::GameStarted => "game_started",
            SessionField::GameFinished => "game_finished",
            SessionField::ChosenSide => "chosen_side",
            SessionField::PendingMoveOrigin => "pending_move_origin",
            SessionField::LastFulfillmentParams => "fulfillment_params",
            SessionField::PositionHistory => "position_history",
            SessionField::RestartRequested => "restart_requested",
        }
    }
}

impl fmt::Display for SessionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed session record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub game_started: bool,
    pub game_finished: bool,
    /// Color the human plays; fixed until a restart
    pub chosen_side: Option<Color>,
    /// Origin square waiting for a destination from a later utterance
    pub pending_move_origin: Option<Square>,
    /// Most recent extracted parameters, kept for auditing
    pub last_fulfillment_params: Option<Value>,
    /// Positions before each applied move, oldest first
    pub position_history: Vec<Position>,
    /// RESTART_GAME asked for confirmation and is waiting on YES/NO
    pub restart_requested: bool,
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        match (self.game_started, self.game_finished) {
            (false, _) => Phase::NotStarted,
            (true, false) => Phase::InProgress,
            (true, true) => Phase::Finished,
        }
    }

    /// Read every field of a session; unset fields keep their defaults
    pub async fn load(store: &dyn SessionStore, session_id: &str) -> StoreResult<Self> {
        let mut state = Self::default();
        for field in SessionField::ALL {
            if let Some(value) = store.get(session_id, field).await? {
                state.apply_field(field, value)?;
            }
        }
        Ok(state)
    }

    /// Write the fields that differ from `before`; returns how many were written
    pub async fn save_changes(
        &self,
        before: &Self,
        store: &dyn SessionStore,
        session_id: &str,
    ) -> StoreResult<usize> {
        // Encode everything before touching the store
        let fields = self
            .changed_fields(before)
            .into_iter()
            .map(|field| Ok((field, self.field_value(field)?)))
            .collect::<StoreResult<Vec<_>>>()?;
        let written = fields.len();
        if written > 0 {
            store.set_many(session_id, fields).await?;
        }
        Ok(written)
    }

    pub fn changed_fields(&self, before: &Self) -> Vec<SessionField> {
        SessionField::ALL
            .into_iter()
            .filter(|field| match field {
                SessionField::GameStarted => self.game_started != before.game_started,
                SessionField::GameFinished => self.game_finished != before.game_finished,
                SessionField::ChosenSide => self.chosen_side != before.chosen_side,
                SessionField::PendingMoveOrigin => {
                    self.pending_move_origin != before.pending_move_origin
                }
                SessionField::LastFulfillmentParams => {
                    self.last_fulfillment_params != before.last_fulfillment_params
                }
                SessionField::PositionHistory => self.position_history != before.position_history,
                SessionField::RestartRequested => {
                    self.restart_requested != before.restart_requested
                }
            })
            .collect()
    }

    /// Put back the fields a failed attempt is not allowed to touch
    pub fn restore_phase_fields(&mut self, before: &Self) {
        self.game_started = before.game_started;
        self.game_finished = before.game_finished;
        self.chosen_side = before.chosen_side;
        self.position_history = before.position_history.clone();
    }

    /// Back to NOT_STARTED defaults
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn field_value(&self, field: SessionField) -> StoreResult<Value> {
        let encoded = match field {
            SessionField::GameStarted => serde_json::to_value(self.game_started),
            SessionField::GameFinished => serde_json::to_value(self.game_finished),
            SessionField::ChosenSide => serde_json::to_value(self.chosen_side),
            SessionField::PendingMoveOrigin => serde_json::to_value(self.pending_move_origin),
            SessionField::LastFulfillmentParams => {
                serde_json::to_value(&self.last_fulfillment_params)
            }
            SessionField::PositionHistory => serde_json::to_value(&self.position_history),
            SessionField::RestartRequested => serde_json::to_value(self.restart_requested),
        };
        encoded.map_err(|source| StoreError::Serialization {
            field: field.as_str(),
            source,
        })
    }

    fn apply_field(&mut self, field: SessionField, value: Value) -> StoreResult<()> {
        match field {
            SessionField::GameStarted => self.game_started = decode(field, value)?,
            SessionField::GameFinished => self.game_finished = decode(field, value)?,
            SessionField::ChosenSide => self.chosen_side = decode(field, value)?,
            SessionField::PendingMoveOrigin => self.pending_move_origin = decode(field, value)?,
            SessionField::LastFulfillmentParams => {
                self.last_fulfillment_params = decode(field, value)?
            }
            SessionField::PositionHistory => self.position_history = decode(field, value)?,
            SessionField::RestartRequested => self.restart_requested = decode(field, value)?,
        }
        Ok(())
    }
}

fn decode<T: DeserializeOwned + Default>(field: SessionField, value: Value) -> StoreResult<T> {
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value).map_err(|source| StoreError::Serialization {
        field: field.as_str(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Memory store that records batch sizes and can refuse writes
    #[derive(Default)]
    struct Recording {
        inner: MemoryStore,
        batches: Mutex<Vec<usize>>,
        refuse: bool,
    }

    #[async_trait]
    impl SessionStore for Recording {
        async fn get(&self, session_id: &str, field: SessionField) -> StoreResult<Option<Value>> {
            self.inner.get(session_id, field).await
        }

        async fn set(&self, session_id: &str, field: SessionField, value: Value) -> StoreResult<()> {
            self.set_many(session_id, vec![(field, value)]).await
        }

        async fn set_many(
            &self,
            session_id: &str,
            fields: Vec<(SessionField, Value)>,
        ) -> StoreResult<()> {
            if self.refuse {
                return Err(StoreError::Unavailable("disk full".to_string()));
            }
            self.batches.lock().push(fields.len());
            self.inner.set_many(session_id, fields).await
        }
    }

    #[test]
    fn test_phase_derivation() {
        let mut state = SessionState::default();
        assert_eq!(state.phase(), Phase::NotStarted);

        state.game_started = true;
        assert_eq!(state.phase(), Phase::InProgress);

        state.game_finished = true;
        assert_eq!(state.phase(), Phase::Finished);
    }

    #[test]
    fn test_finished_requires_started() {
        let state = SessionState {
            game_finished: true,
            ..Default::default()
        };
        assert_eq!(state.phase(), Phase::NotStarted);
    }

    #[test]
    fn test_changed_fields_only_reports_differences() {
        let before = SessionState::default();
        let mut after = before.clone();
        after.chosen_side = Some(Color::Black);
        after.position_history.push(Position::starting());

        assert_eq!(
            after.changed_fields(&before),
            vec![SessionField::ChosenSide, SessionField::PositionHistory]
        );
    }

    #[test]
    fn test_restore_phase_fields_keeps_pending_origin() {
        let before = SessionState::default();
        let mut draft = before.clone();
        draft.game_started = true;
        draft.pending_move_origin = Some("e2".parse().unwrap());

        draft.restore_phase_fields(&before);

        assert!(!draft.game_started);
        assert_eq!(draft.pending_move_origin, Some("e2".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_load_unknown_session_is_default() {
        let store = MemoryStore::new();
        let state = SessionState::load(&store, "nobody").await.unwrap();
        assert_eq!(state, SessionState::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = MemoryStore::new();
        let before = SessionState::default();
        let after = SessionState {
            game_started: true,
            chosen_side: Some(Color::White),
            position_history: vec![Position::starting()],
            ..Default::default()
        };

        let written = after.save_changes(&before, &store, "s1").await.unwrap();
        assert_eq!(written, 3);

        let loaded = SessionState::load(&store, "s1").await.unwrap();
        assert_eq!(loaded, after);
    }

    #[tokio::test]
    async fn test_save_writes_one_batch() {
        let store = Recording::default();
        let after = SessionState {
            game_started: true,
            chosen_side: Some(Color::Black),
            restart_requested: true,
            ..Default::default()
        };

        after
            .save_changes(&SessionState::default(), &store, "s1")
            .await
            .unwrap();
        assert_eq!(*store.batches.lock(), vec![3]);

        // Nothing changed: no write at all
        after.save_changes(&after, &store, "s1").await.unwrap();
        assert_eq!(store.batches.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_refused_save_leaves_record_untouched() {
        let store = Recording {
            refuse: true,
            ..Default::default()
        };
        let after = SessionState {
            game_started: true,
            position_history: vec![Position::starting()],
            ..Default::default()
        };

        let result = after.save_changes(&SessionState::default(), &store, "s1").await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(
            SessionState::load(&store, "s1").await.unwrap(),
            SessionState::default()
        );
    }
}
