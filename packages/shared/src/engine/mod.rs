//! Chess engine collaborator.
//!
//! Move legality, best-move search and position canonicalization all come
//! from an engine speaking a UCI-like protocol. Every request gets its own
//! session from an [`EngineLauncher`], drives it through a fixed command
//! sequence and stops it before returning.

pub mod board;
pub mod stockfish;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{EngineConfig, EngineKind};
use crate::models::position::PositionDirective;

#[cfg(test)]
use mockall::automock;

#[derive(Debug)]
pub enum EngineError {
    NotRunning,
    Io(String),
    Protocol(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NotRunning => write!(f, "Engine is not running"),
            EngineError::Io(msg) => write!(f, "Engine I/O error: {}", msg),
            EngineError::Protocol(msg) => write!(f, "Engine protocol error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io(err.to_string())
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Engine: Send {
    /// Boots the engine. `false` means the session is unusable.
    async fn start(&mut self) -> bool;

    async fn send_command(&mut self, command: &str) -> Result<(), EngineError>;

    /// Reads at most `max_lines` lines of output, joined with `\n`.
    async fn read_output(&mut self, max_lines: usize) -> Result<String, EngineError>;

    async fn best_move(
        &mut self,
        position: &PositionDirective,
        think_time_ms: u64,
    ) -> Result<String, EngineError>;

    async fn legal_moves(&mut self, position: &PositionDirective)
        -> Result<Vec<String>, EngineError>;

    async fn stop(&mut self);
}

#[cfg_attr(test, automock)]
pub trait EngineLauncher: Send + Sync {
    fn launch(&self) -> Box<dyn Engine>;
}

pub fn launcher_from_config(config: &EngineConfig) -> Arc<dyn EngineLauncher> {
    match config.kind {
        EngineKind::Stockfish => Arc::new(stockfish::StockfishLauncher::new(config.clone())),
        EngineKind::Board => Arc::new(board::BoardEngineLauncher),
    }
}
