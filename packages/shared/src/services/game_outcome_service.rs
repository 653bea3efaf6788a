//! Decides whether a position ends the game.
//!
//! Input is the engine's `d` dump plus the legal moves it reported for the
//! same position. Rules are applied in a fixed order and the first match
//! wins: an empty move list is decisive before the clock or the material
//! count are looked at.

use std::fmt;

use crate::models::game::{Outcome, Termination, Winner};
use crate::models::position::{Position, PositionError};

pub const FEN_PREFIX: &str = "Fen: ";
pub const CHECKERS_PREFIX: &str = "Checkers: ";
pub const FIFTY_MOVE_HALFMOVES: u32 = 100;

#[derive(Debug, PartialEq)]
pub enum StatusDumpError {
    MissingLine(&'static str),
    BadPosition(PositionError),
}

impl fmt::Display for StatusDumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusDumpError::MissingLine(prefix) => {
                write!(f, "Engine status dump has no '{}' line", prefix.trim())
            }
            StatusDumpError::BadPosition(err) => {
                write!(f, "Engine reported an unreadable position: {}", err)
            }
        }
    }
}

impl std::error::Error for StatusDumpError {}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionStatus {
    pub position: Position,
    pub in_check: bool,
}

impl PositionStatus {
    pub fn from_dump(dump: &str) -> Result<Self, StatusDumpError> {
        let mut fen = None;
        let mut checkers = None;

        for line in dump.lines() {
            if let Some(rest) = line.strip_prefix(FEN_PREFIX) {
                fen = Some(rest.trim());
            } else if let Some(rest) = line
                .strip_prefix(CHECKERS_PREFIX)
                // an empty checker list may have lost its trailing space
                .or_else(|| (line.trim_end() == CHECKERS_PREFIX.trim_end()).then_some(""))
            {
                checkers = Some(rest.trim());
            }
        }

        let fen = fen.ok_or(StatusDumpError::MissingLine(FEN_PREFIX))?;
        let checkers = checkers.ok_or(StatusDumpError::MissingLine(CHECKERS_PREFIX))?;
        let position = fen.parse().map_err(StatusDumpError::BadPosition)?;

        Ok(PositionStatus {
            position,
            in_check: !checkers.is_empty(),
        })
    }
}

/// Whether either side keeps enough force to mate.
///
/// Any pawn, rook or queen is enough. Otherwise a side needs two minor
/// pieces; a lone bishop or knight per side is a draw.
pub fn has_sufficient_material(position: &Position) -> bool {
    let mut white_minors = 0;
    let mut black_minors = 0;

    for piece in position.pieces() {
        match piece {
            'k' | 'K' => continue,
            'p' | 'P' | 'q' | 'Q' | 'r' | 'R' => return true,
            c if c.is_ascii_lowercase() => black_minors += 1,
            _ => white_minors += 1,
        }
        if white_minors > 1 || black_minors > 1 {
            return true;
        }
    }
    false
}

pub fn evaluate(status: &PositionStatus, legal_moves: &[String]) -> Option<Outcome> {
    let position = &status.position;

    let (winner, termination) = if legal_moves.is_empty() && status.in_check {
        (
            Winner::from(position.side_to_move.opponent()),
            Termination::Checkmate,
        )
    } else if legal_moves.is_empty() {
        (Winner::Draw, Termination::Stalemate)
    } else if position.halfmove_clock >= FIFTY_MOVE_HALFMOVES {
        (Winner::Draw, Termination::FiftyMoveRule)
    } else if !has_sufficient_material(position) {
        (Winner::Draw, Termination::InsufficientMaterial)
    } else {
        return None;
    };

    Some(Outcome {
        winner,
        termination,
    })
}
