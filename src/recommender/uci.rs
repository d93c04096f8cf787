//! UCI engine recommender
//!
//! Runs an external UCI engine (Stockfish or compatible) for a single search
//! per call: start the process, handshake, search with `go movetime`, read
//! `bestmove`, quit. Keeping no engine alive between requests means there is
//! no shared engine state between sessions.
//!
//! The child is spawned with `kill_on_drop`, so when [`super::recommend_within`]
//! drops the future at its deadline the engine process goes with it.

use super::error::{RecommenderError, RecommenderResult};
use super::MoveRecommender;
use crate::chess::{ChessMove, Position};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{ChildStdin, ChildStdout, Command};
use tracing::{debug, info};

/// Recommender that shells out to a UCI engine binary
#[derive(Debug, Clone)]
pub struct UciEngine {
    path: PathBuf,
}

impl UciEngine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MoveRecommender for UciEngine {
    async fn best_move(
        &self,
        position: &Position,
        budget: Duration,
    ) -> RecommenderResult<ChessMove> {
        let mut child = Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RecommenderError::Unavailable(format!("{}: {}", self.path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RecommenderError::Unavailable("engine stdin not captured".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RecommenderError::Unavailable("engine stdout not captured".into()))?;
        let mut lines = BufReader::new(stdout).lines();

        send(&mut stdin, "uci").await?;
        wait_for(&mut lines, |line| line == "uciok").await?;
        send(&mut stdin, "isready").await?;
        wait_for(&mut lines, |line| line == "readyok").await?;

        send(&mut stdin, &format!("position fen {}", position)).await?;
        let millis = budget.as_millis().max(1);
        send(&mut stdin, &format!("go movetime {}", millis)).await?;
        let answer = wait_for(&mut lines, |line| line.starts_with("bestmove")).await?;

        // Engine is done with us either way; kill_on_drop covers a stuck quit
        let _ = send(&mut stdin, "quit").await;
        let _ = child.wait().await;

        let mv = parse_bestmove(&answer)?;
        info!("[RECOMMENDER] UCI engine chose {} in {}ms", mv, millis);
        Ok(mv)
    }

    fn name(&self) -> &str {
        "uci"
    }
}

async fn send(stdin: &mut ChildStdin, command: &str) -> RecommenderResult<()> {
    debug!("[RECOMMENDER] >> {}", command);
    stdin
        .write_all(format!("{}\n", command).as_bytes())
        .await
        .map_err(|e| RecommenderError::Unavailable(e.to_string()))?;
    stdin
        .flush()
        .await
        .map_err(|e| RecommenderError::Unavailable(e.to_string()))
}

async fn wait_for(
    lines: &mut Lines<BufReader<ChildStdout>>,
    done: impl Fn(&str) -> bool,
) -> RecommenderResult<String> {
    loop {
        let line = lines
            .next_line()
            .await
            .map_err(|e| RecommenderError::Unavailable(e.to_string()))?
            .ok_or_else(|| RecommenderError::Unavailable("engine closed its output".into()))?;
        let line = line.trim().to_string();
        if done(&line) {
            return Ok(line);
        }
    }
}

/// Parse a `bestmove e2e4 [ponder e7e5]` line
fn parse_bestmove(line: &str) -> RecommenderResult<ChessMove> {
    let token = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| RecommenderError::Protocol(line.to_string()))?;
    if token == "(none)" || token == "0000" {
        return Err(RecommenderError::NoMove);
    }
    token
        .parse()
        .map_err(|_| RecommenderError::Protocol(line.to_string()))
}
