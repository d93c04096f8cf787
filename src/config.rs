//! Configuration
//!
//! [`AndyConfig`] is assembled in three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. A JSON settings file: an explicit path, else `settings.json` in the
//!    platform config directory (e.g. `~/.config/andy/settings.json`)
//! 3. `.env` and process environment variables
//!
//! | Variable              | Field                        |
//! |-----------------------|------------------------------|
//! | `ANDY_ENGINE_PATH`    | `recommender.engine_path`    |
//! | `STOCKFISH_LOCATION`  | `recommender.engine_path` (if the above is unset) |
//! | `ANDY_RECOMMENDER`    | `recommender.kind`           |
//! | `ANDY_TIME_BUDGET_MS` | `recommender.time_budget_ms` |
//! | `ANDY_STORE`          | `store.kind`                 |
//! | `ANDY_STORE_DIR`      | `store.directory`            |
//! | `ANDY_REPLIES`        | `andy_replies`               |
//! | `ANDY_BIND_ADDR`      | `bind_addr`                  |
//!
//! # Error Handling
//!
//! A missing settings file is normal. A file that cannot be read or parsed is
//! logged and the defaults are used instead; a bad environment value is
//! logged and ignored.

use crate::chess::{RuleOracle, ShakmatyOracle};
use crate::dispatcher::{EngineOptions, Fulfiller};
use crate::recommender::{MaterialRecommender, MoveRecommender, SearchBudget, UciEngine};
use crate::session::{FileStore, MemoryStore, SessionStore};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommenderKind {
    Uci,
    Material,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Memory,
    #[default]
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Unset: UCI when an engine path is known, material otherwise
    pub kind: Option<RecommenderKind>,
    pub engine_path: Option<PathBuf>,
    pub time_budget_ms: u64,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            kind: None,
            engine_path: None,
            time_budget_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    pub directory: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::File,
            directory: PathBuf::from("./sessions"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AndyConfig {
    pub recommender: RecommenderConfig,
    pub store: StoreConfig,
    /// Andy answers every successful user move with one of its own
    pub andy_replies: bool,
    /// HTTP listen address (backend only)
    pub bind_addr: String,
}

impl Default for AndyConfig {
    fn default() -> Self {
        Self {
            recommender: RecommenderConfig::default(),
            store: StoreConfig::default(),
            andy_replies: false,
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AndyConfig {
    /// Full layered load: defaults, settings file, then `.env` and environment
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::settings_path);

        let mut config = if path.exists() {
            match Self::from_file(&path) {
                Ok(config) => {
                    info!("[CONFIG] Loaded settings from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("[CONFIG] {}. Using defaults.", e);
                    Self::default()
                }
            }
        } else {
            info!("[CONFIG] No settings file at {:?}. Using defaults.", path);
            Self::default()
        };

        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                warn!("[CONFIG] Ignoring unreadable .env: {}", e);
            }
        }
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// `settings.json` in the platform config directory, or the working
    /// directory when none can be determined
    pub fn settings_path() -> PathBuf {
        match ProjectDirs::from("com", "andy", "andy") {
            Some(dirs) => dirs.config_dir().join(SETTINGS_FILENAME),
            None => PathBuf::from(SETTINGS_FILENAME),
        }
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay environment values; `lookup` is `std::env::var` outside tests
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = get("ANDY_ENGINE_PATH").or_else(|| get("STOCKFISH_LOCATION")) {
            self.recommender.engine_path = Some(PathBuf::from(path));
        }
        if let Some(kind) = get("ANDY_RECOMMENDER") {
            match kind.trim().to_ascii_lowercase().as_str() {
                "uci" => self.recommender.kind = Some(RecommenderKind::Uci),
                "material" => self.recommender.kind = Some(RecommenderKind::Material),
                other => warn!("[CONFIG] Unknown ANDY_RECOMMENDER '{}'", other),
            }
        }
        if let Some(ms) = get("ANDY_TIME_BUDGET_MS") {
            match ms.trim().parse() {
                Ok(ms) => self.recommender.time_budget_ms = ms,
                Err(e) => warn!("[CONFIG] Bad ANDY_TIME_BUDGET_MS '{}': {}", ms, e),
            }
        }
        if let Some(kind) = get("ANDY_STORE") {
            match kind.trim().to_ascii_lowercase().as_str() {
                "memory" => self.store.kind = StoreKind::Memory,
                "file" => self.store.kind = StoreKind::File,
                other => warn!("[CONFIG] Unknown ANDY_STORE '{}'", other),
            }
        }
        if let Some(dir) = get("ANDY_STORE_DIR") {
            self.store.directory = PathBuf::from(dir);
        }
        if let Some(flag) = get("ANDY_REPLIES") {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.andy_replies = true,
                "0" | "false" | "no" | "off" => self.andy_replies = false,
                other => warn!("[CONFIG] Bad ANDY_REPLIES '{}'", other),
            }
        }
        if let Some(addr) = get("ANDY_BIND_ADDR") {
            self.bind_addr = addr;
        }
    }

    pub fn recommender_kind(&self) -> RecommenderKind {
        self.recommender.kind.unwrap_or(if self.recommender.engine_path.is_some() {
            RecommenderKind::Uci
        } else {
            RecommenderKind::Material
        })
    }

    pub fn budget(&self) -> SearchBudget {
        SearchBudget {
            think: Duration::from_millis(self.recommender.time_budget_ms),
            ..SearchBudget::default()
        }
    }

    pub fn build_recommender(&self, oracle: Arc<dyn RuleOracle>) -> Arc<dyn MoveRecommender> {
        match (self.recommender_kind(), &self.recommender.engine_path) {
            (RecommenderKind::Uci, Some(path)) => {
                info!("[CONFIG] Using UCI engine at {:?}", path);
                Arc::new(UciEngine::new(path.clone()))
            }
            (RecommenderKind::Uci, None) => {
                warn!("[CONFIG] UCI recommender requested without an engine path, using material");
                Arc::new(MaterialRecommender::new(oracle))
            }
            (RecommenderKind::Material, _) => Arc::new(MaterialRecommender::new(oracle)),
        }
    }

    pub fn build_store(&self) -> Arc<dyn SessionStore> {
        match self.store.kind {
            StoreKind::Memory => Arc::new(MemoryStore::new()),
            StoreKind::File => {
                info!("[CONFIG] Sessions stored under {:?}", self.store.directory);
                Arc::new(FileStore::new(self.store.directory.clone()))
            }
        }
    }

    /// Wire up an engine with the shakmaty oracle and the configured collaborators
    pub fn build_fulfiller(&self) -> Fulfiller {
        let oracle: Arc<dyn RuleOracle> = Arc::new(ShakmatyOracle::new());
        let recommender = self.build_recommender(Arc::clone(&oracle));
        Fulfiller::new(oracle, recommender, self.build_store()).with_options(EngineOptions {
            budget: self.budget(),
            andy_replies: self.andy_replies,
        })
    }
}
