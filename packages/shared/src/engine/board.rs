//! In-process engine built on the `chess` crate.
//!
//! Speaks the same protocol subset as the Stockfish session (`position`,
//! `d`, `go`) but always answers with the first legal move in generation
//! order, so games against it are deterministic. Used for local runs and
//! in tests.

use std::collections::VecDeque;
use std::str::FromStr;

use async_trait::async_trait;
use chess::{Board, ChessMove, Color, MoveGen, Piece};
use tracing::debug;

use crate::engine::{Engine, EngineError, EngineLauncher};
use crate::models::position::{Position, PositionDirective};

pub struct BoardEngineLauncher;

impl EngineLauncher for BoardEngineLauncher {
    fn launch(&self) -> Box<dyn Engine> {
        Box::new(BoardEngine::new())
    }
}

#[derive(Default)]
pub struct BoardEngine {
    running: bool,
    current: Option<(Board, Position)>,
    output: VecDeque<String>,
}

impl BoardEngine {
    pub fn new() -> Self {
        BoardEngine::default()
    }

    fn ensure_running(&self) -> Result<(), EngineError> {
        if self.running {
            Ok(())
        } else {
            Err(EngineError::NotRunning)
        }
    }

    fn set_position(&mut self, directive: &PositionDirective) -> Result<(), EngineError> {
        self.current = Some(play_out(directive)?);
        Ok(())
    }

    fn status_dump(&self) -> Result<Vec<String>, EngineError> {
        let (board, position) = self
            .current
            .as_ref()
            .ok_or_else(|| EngineError::Protocol("no position set".to_string()))?;
        let checkers: Vec<String> = (*board.checkers()).map(|sq| sq.to_string()).collect();
        Ok(vec![
            String::new(),
            format!("Fen: {}", position),
            format!("Checkers: {}", checkers.join(" ")),
        ])
    }
}

fn legal_tokens(board: &Board) -> Vec<String> {
    MoveGen::new_legal(board).map(|m| m.to_string()).collect()
}

/// Replays the directive's moves, keeping the move counters the `chess`
/// crate does not track.
fn play_out(directive: &PositionDirective) -> Result<(Board, Position), EngineError> {
    let fen = directive.fen.to_string();
    let mut board = Board::from_str(&fen)
        .map_err(|e| EngineError::Protocol(format!("unusable position {}: {}", fen, e)))?;
    let mut position = directive.fen.clone();

    for token in &directive.moves {
        let chess_move: ChessMove = MoveGen::new_legal(&board)
            .find(|m| m.to_string() == *token)
            .ok_or_else(|| EngineError::Protocol(format!("illegal move {}", token)))?;

        let resets_clock = board.piece_on(chess_move.get_source()) == Some(Piece::Pawn)
            || board.piece_on(chess_move.get_dest()).is_some();
        let black_moved = board.side_to_move() == Color::Black;
        board = board.make_move_new(chess_move);

        let halfmove_clock = if resets_clock {
            0
        } else {
            position.halfmove_clock + 1
        };
        let fullmove_number = position.fullmove_number + u32::from(black_moved);
        let prefix: Vec<String> = board
            .to_string()
            .split_whitespace()
            .take(4)
            .map(str::to_string)
            .collect();
        position = format!(
            "{} {} {}",
            prefix.join(" "),
            halfmove_clock,
            fullmove_number
        )
        .parse()
        .map_err(|e| EngineError::Protocol(format!("unreadable board state: {}", e)))?;
    }

    Ok((board, position))
}

#[async_trait]
impl Engine for BoardEngine {
    async fn start(&mut self) -> bool {
        self.running = true;
        true
    }

    async fn send_command(&mut self, command: &str) -> Result<(), EngineError> {
        self.ensure_running()?;
        debug!("board engine <- {}", command);

        let mut words = command.split_whitespace();
        match words.next() {
            Some("position") => {
                let rest = command.trim_start()["position".len()..].trim();
                let directive = parse_directive(rest)?;
                self.set_position(&directive)
            }
            Some("d") => {
                let dump = self.status_dump()?;
                self.output.extend(dump);
                Ok(())
            }
            Some("uci") => {
                self.output.push_back("id name board".to_string());
                self.output.push_back("uciok".to_string());
                Ok(())
            }
            Some("isready") => {
                self.output.push_back("readyok".to_string());
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn read_output(&mut self, max_lines: usize) -> Result<String, EngineError> {
        self.ensure_running()?;
        let count = max_lines.min(self.output.len());
        let lines: Vec<String> = self.output.drain(..count).collect();
        Ok(lines.join("\n"))
    }

    async fn best_move(
        &mut self,
        position: &PositionDirective,
        _think_time_ms: u64,
    ) -> Result<String, EngineError> {
        self.ensure_running()?;
        self.set_position(position)?;
        let (board, _) = self
            .current
            .as_ref()
            .ok_or_else(|| EngineError::Protocol("no position set".to_string()))?;
        legal_tokens(board)
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::Protocol("no legal move available".to_string()))
    }

    async fn legal_moves(
        &mut self,
        position: &PositionDirective,
    ) -> Result<Vec<String>, EngineError> {
        self.ensure_running()?;
        self.set_position(position)?;
        Ok(self
            .current
            .as_ref()
            .map(|(board, _)| legal_tokens(board))
            .unwrap_or_default())
    }

    async fn stop(&mut self) {
        self.running = false;
        self.current = None;
        self.output.clear();
    }
}

/// Parses `fen <FEN> [moves <m>...]` or `startpos [moves <m>...]`.
fn parse_directive(text: &str) -> Result<PositionDirective, EngineError> {
    let (base, moves) = match text.split_once(" moves ") {
        Some((base, moves)) => (base.trim(), moves.split_whitespace().map(str::to_string).collect()),
        None => (text.trim(), vec![]),
    };

    let fen = if base == "startpos" {
        Position::starting()
    } else {
        base.strip_prefix("fen ")
            .ok_or_else(|| EngineError::Protocol(format!("unknown position '{}'", base)))?
            .parse()
            .map_err(|e| EngineError::Protocol(format!("bad fen: {}", e)))?
    };

    Ok(PositionDirective { fen, moves })
}
