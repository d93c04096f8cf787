//! Session Store - field-level key/value persistence per session
//!
//! The engine needs nothing more than `get` and `set` of a named field for a
//! session id. Each call is atomic on its own, and `set_many` writes a batch
//! of fields as one unit so a failed save never leaves half a record behind.
//! Sequences of calls are not atomic, which is why the dispatcher serializes
//! requests per session with [`super::SessionLocks`].
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local map, used by tests and the console
//! - [`FileStore`]: one JSON document per session under a directory, keyed
//!   by field name

use super::error::{StoreError, StoreResult};
use super::state::SessionField;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Field-level session persistence
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read one field; `None` when it was never set
    async fn get(&self, session_id: &str, field: SessionField) -> StoreResult<Option<Value>>;

    /// Write one field
    async fn set(&self, session_id: &str, field: SessionField, value: Value) -> StoreResult<()>;

    /// Write several fields at once; on error none of them are visible
    async fn set_many(&self, session_id: &str, fields: Vec<(SessionField, Value)>) -> StoreResult<()>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, HashMap<&'static str, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions that have at least one field written
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, session_id: &str, field: SessionField) -> StoreResult<Option<Value>> {
        Ok(self
            .sessions
            .read()
            .get(session_id)
            .and_then(|fields| fields.get(field.as_str()).cloned()))
    }

    async fn set(&self, session_id: &str, field: SessionField, value: Value) -> StoreResult<()> {
        self.set_many(session_id, vec![(field, value)]).await
    }

    async fn set_many(&self, session_id: &str, fields: Vec<(SessionField, Value)>) -> StoreResult<()> {
        let mut sessions = self.sessions.write();
        let record = sessions.entry(session_id.to_string()).or_default();
        for (field, value) in fields {
            record.insert(field.as_str(), value);
        }
        Ok(())
    }
}

const ENCODED_PREFIX: &str = "x-";

/// JSON-file store: `<directory>/<session>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Plain ids are used as they are; anything else becomes `x-<hex>`.
    /// Plain ids never start with `x-`, so the two forms cannot collide.
    fn session_path(&self, session_id: &str) -> PathBuf {
        let plain = !session_id.is_empty()
            && !session_id.starts_with(ENCODED_PREFIX)
            && session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        let stem = if plain {
            session_id.to_string()
        } else {
            let hex: String = session_id.bytes().map(|b| format!("{:02x}", b)).collect();
            format!("{}{}", ENCODED_PREFIX, hex)
        };
        self.directory.join(format!("{}.json", stem))
    }

    async fn read_document(&self, path: &Path) -> StoreResult<Map<String, Value>> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| StoreError::Serialization {
                    field: "<document>",
                    source,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SessionStore for FileStore {
    async fn get(&self, session_id: &str, field: SessionField) -> StoreResult<Option<Value>> {
        let document = self.read_document(&self.session_path(session_id)).await?;
        Ok(document.get(field.as_str()).cloned())
    }

    async fn set(&self, session_id: &str, field: SessionField, value: Value) -> StoreResult<()> {
        self.set_many(session_id, vec![(field, value)]).await
    }

    async fn set_many(&self, session_id: &str, fields: Vec<(SessionField, Value)>) -> StoreResult<()> {
        let path = self.session_path(session_id);
        let mut document = self.read_document(&path).await?;
        let count = fields.len();
        for (field, value) in fields {
            document.insert(field.as_str().to_string(), value);
        }

        tokio::fs::create_dir_all(&self.directory).await?;
        let json = serde_json::to_string_pretty(&document).map_err(|source| {
            StoreError::Serialization {
                field: "<document>",
                source,
            }
        })?;

        // Whole document goes through one rename, so a batch lands entirely or not at all
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, json).await?;
        tokio::fs::rename(&staging, &path).await?;
        debug!("[STORE] Wrote {} field(s) for session {} to {:?}", count, session_id, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("s", SessionField::GameStarted).await.unwrap(), None);

        store
            .set("s", SessionField::GameStarted, json!(true))
            .await
            .unwrap();
        assert_eq!(
            store.get("s", SessionField::GameStarted).await.unwrap(),
            Some(json!(true))
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_isolates_sessions() {
        let store = MemoryStore::new();
        store
            .set("a", SessionField::ChosenSide, json!("white"))
            .await
            .unwrap();
        assert_eq!(store.get("b", SessionField::ChosenSide).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_persists_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("sessions"));

        store
            .set("abc-123", SessionField::ChosenSide, json!("black"))
            .await
            .unwrap();
        store
            .set("abc-123", SessionField::GameStarted, json!(true))
            .await
            .unwrap();

        let reopened = FileStore::new(dir.path().join("sessions"));
        assert_eq!(
            reopened.get("abc-123", SessionField::ChosenSide).await.unwrap(),
            Some(json!("black"))
        );
        assert_eq!(
            reopened.get("abc-123", SessionField::GameStarted).await.unwrap(),
            Some(json!(true))
        );
    }

    #[tokio::test]
    async fn test_file_store_batch_lands_in_one_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store
            .set_many(
                "batch",
                vec![
                    (SessionField::GameStarted, json!(true)),
                    (SessionField::ChosenSide, json!("white")),
                ],
            )
            .await
            .unwrap();

        let document: Map<String, Value> =
            serde_json::from_str(&std::fs::read_to_string(store.session_path("batch")).unwrap())
                .unwrap();
        assert_eq!(document.len(), 2);
        assert!(!store.session_path("batch").with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_keeps_encoded_and_plain_ids_apart() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        // "a b" hex-encodes to 612062
        store
            .set("a b", SessionField::GameStarted, json!(true))
            .await
            .unwrap();
        assert_eq!(store.get("612062", SessionField::GameStarted).await.unwrap(), None);

        store
            .set("x-612062", SessionField::ChosenSide, json!("white"))
            .await
            .unwrap();
        assert_eq!(store.get("a b", SessionField::ChosenSide).await.unwrap(), None);

        let paths = [
            store.session_path("a b"),
            store.session_path("612062"),
            store.session_path("x-612062"),
        ];
        assert_ne!(paths[0], paths[1]);
        assert_ne!(paths[0], paths[2]);
        assert_ne!(paths[1], paths[2]);
    }

    #[tokio::test]
    async fn test_file_store_escapes_unsafe_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store
            .set("../escape", SessionField::GameStarted, json!(true))
            .await
            .unwrap();

        let path = store.session_path("../escape");
        assert!(path.starts_with(dir.path()));
        assert!(path.exists());
    }
}
