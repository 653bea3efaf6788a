use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, error, warn};

use crate::config::EngineConfig;
use crate::engine::{Engine, EngineError, EngineLauncher};
use crate::models::position::PositionDirective;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

pub struct StockfishLauncher {
    config: EngineConfig,
}

impl StockfishLauncher {
    pub fn new(config: EngineConfig) -> Self {
        StockfishLauncher { config }
    }
}

impl EngineLauncher for StockfishLauncher {
    fn launch(&self) -> Box<dyn Engine> {
        Box::new(StockfishEngine::new(
            &self.config.stockfish_path,
            Duration::from_millis(self.config.read_timeout_ms),
        ))
    }
}

/// A Stockfish process spoken to over stdin/stdout.
pub struct StockfishEngine {
    path: String,
    read_timeout: Duration,
    process: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: Option<Lines<BufReader<ChildStdout>>>,
}

impl StockfishEngine {
    pub fn new(path: &str, read_timeout: Duration) -> Self {
        StockfishEngine {
            path: path.to_string(),
            read_timeout,
            process: None,
            stdin: None,
            stdout: None,
        }
    }

    /// Next output line, or `None` when the engine stays quiet for `wait`.
    async fn next_line(&mut self, wait: Duration) -> Result<Option<String>, EngineError> {
        let stdout = self.stdout.as_mut().ok_or(EngineError::NotRunning)?;
        match tokio::time::timeout(wait, stdout.next_line()).await {
            Err(_) => Ok(None),
            Ok(Ok(Some(line))) => Ok(Some(line)),
            Ok(Ok(None)) => Err(EngineError::Protocol(
                "engine closed its output".to_string(),
            )),
            Ok(Err(e)) => Err(e.into()),
        }
    }

    async fn read_until(&mut self, prefix: &str, wait: Duration) -> Result<String, EngineError> {
        loop {
            match self.next_line(wait).await? {
                Some(line) if line.starts_with(prefix) => return Ok(line),
                Some(_) => continue,
                None => {
                    return Err(EngineError::Protocol(format!(
                        "timed out waiting for '{}'",
                        prefix
                    )))
                }
            }
        }
    }

    async fn handshake(&mut self) -> Result<(), EngineError> {
        self.send_command("uci").await?;
        self.read_until("uciok", HANDSHAKE_TIMEOUT).await?;
        self.send_command("isready").await?;
        self.read_until("readyok", HANDSHAKE_TIMEOUT).await?;
        Ok(())
    }
}

/// Extracts the move from a `bestmove <move> [ponder <move>]` line.
pub fn parse_best_move(line: &str) -> Option<String> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("bestmove") {
        return None;
    }
    match parts.next() {
        Some("(none)") | None => None,
        Some(token) => Some(token.to_string()),
    }
}

/// Extracts the move from a `go perft 1` line such as `e2e4: 1`.
pub fn parse_perft_line(line: &str) -> Option<String> {
    let (token, count) = line.split_once(':')?;
    let token = token.trim();
    let is_move = (4..=5).contains(&token.len()) && token.chars().all(|c| c.is_ascii_alphanumeric());
    if is_move && count.trim().parse::<u64>().is_ok() {
        Some(token.to_string())
    } else {
        None
    }
}

#[async_trait]
impl Engine for StockfishEngine {
    async fn start(&mut self) -> bool {
        let spawned = Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                error!("Failed to spawn engine at {}: {}", self.path, e);
                return false;
            }
        };

        self.stdin = child.stdin.take();
        self.stdout = child.stdout.take().map(|out| BufReader::new(out).lines());
        self.process = Some(child);

        if let Err(e) = self.handshake().await {
            error!("Engine handshake failed: {}", e);
            self.stop().await;
            return false;
        }

        debug!("Engine started: {}", self.path);
        true
    }

    async fn send_command(&mut self, command: &str) -> Result<(), EngineError> {
        let stdin = self.stdin.as_mut().ok_or(EngineError::NotRunning)?;
        debug!("engine <- {}", command);
        stdin.write_all(format!("{}\n", command).as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }

    async fn read_output(&mut self, max_lines: usize) -> Result<String, EngineError> {
        let mut lines = Vec::new();
        while lines.len() < max_lines {
            match self.next_line(self.read_timeout).await? {
                Some(line) => lines.push(line),
                None => break,
            }
        }
        Ok(lines.join("\n"))
    }

    async fn best_move(
        &mut self,
        position: &PositionDirective,
        think_time_ms: u64,
    ) -> Result<String, EngineError> {
        self.send_command(&format!("position {}", position)).await?;
        self.send_command(&format!("go movetime {}", think_time_ms))
            .await?;

        let wait = Duration::from_millis(think_time_ms) + self.read_timeout + HANDSHAKE_TIMEOUT;
        let line = self.read_until("bestmove", wait).await?;
        parse_best_move(&line)
            .ok_or_else(|| EngineError::Protocol(format!("no move in '{}'", line)))
    }

    async fn legal_moves(
        &mut self,
        position: &PositionDirective,
    ) -> Result<Vec<String>, EngineError> {
        self.send_command(&format!("position {}", position)).await?;
        self.send_command("go perft 1").await?;

        let mut moves = Vec::new();
        loop {
            let line = self
                .next_line(HANDSHAKE_TIMEOUT)
                .await?
                .ok_or_else(|| EngineError::Protocol("perft output timed out".to_string()))?;
            if line.starts_with("Nodes searched") {
                return Ok(moves);
            }
            if let Some(token) = parse_perft_line(&line) {
                moves.push(token);
            }
        }
    }

    async fn stop(&mut self) {
        if self.stdin.is_some() {
            if let Err(e) = self.send_command("quit").await {
                warn!("Failed to send quit to engine: {}", e);
            }
        }
        self.stdin = None;
        self.stdout = None;

        if let Some(mut child) = self.process.take() {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, child.wait()).await {
                Ok(Ok(status)) => debug!("Engine exited with {}", status),
                Ok(Err(e)) => warn!("Failed to wait for engine: {}", e),
                Err(_) => {
                    warn!("Engine ignored quit, killing it");
                    if let Err(e) = child.kill().await {
                        error!("Failed to kill engine: {}", e);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("bestmove e7e5 ponder g1f3", Some("e7e5") ; "with ponder")]
    #[test_case("bestmove a7a8q", Some("a7a8q") ; "promotion")]
    #[test_case("bestmove (none)", None ; "no legal move")]
    #[test_case("info depth 12 score cp 31", None ; "info line")]
    fn test_parse_best_move(line: &str, expected: Option<&str>) {
        assert_eq!(parse_best_move(line).as_deref(), expected);
    }

    #[test_case("e2e4: 1", Some("e2e4") ; "plain move")]
    #[test_case("b7b8n: 1", Some("b7b8n") ; "underpromotion")]
    #[test_case("Nodes searched: 20", None ; "summary line")]
    #[test_case("info string NNUE evaluation using nn.nnue", None ; "info line")]
    #[test_case("", None ; "blank line")]
    fn test_parse_perft_line(line: &str, expected: Option<&str>) {
        assert_eq!(parse_perft_line(line).as_deref(), expected);
    }

    #[tokio::test]
    async fn test_start_fails_for_missing_binary() {
        let mut engine = StockfishEngine::new(
            "/nonexistent/path/to/stockfish",
            Duration::from_millis(10),
        );

        assert!(!engine.start().await);
        assert!(matches!(
            engine.send_command("uci").await,
            Err(EngineError::NotRunning)
        ));
        engine.stop().await;
    }

    #[tokio::test]
    async fn test_launcher_uses_configured_path() {
        let launcher = StockfishLauncher::new(EngineConfig {
            stockfish_path: "/nonexistent/stockfish".to_string(),
            ..EngineConfig::default()
        });

        let mut engine = launcher.launch();
        assert!(!engine.start().await);
    }
}
