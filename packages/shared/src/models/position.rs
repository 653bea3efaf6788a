use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "white"),
            Side::Black => write!(f, "black"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    FieldCount(usize),
    Placement(String),
    SideToMove(String),
    Castling(String),
    EnPassant(String),
    Clock(String),
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionError::FieldCount(count) => {
                write!(f, "Expected 6 FEN fields, found {}", count)
            }
            PositionError::Placement(msg) => write!(f, "Invalid piece placement: {}", msg),
            PositionError::SideToMove(value) => write!(f, "Invalid side to move: {}", value),
            PositionError::Castling(value) => write!(f, "Invalid castling rights: {}", value),
            PositionError::EnPassant(value) => write!(f, "Invalid en passant square: {}", value),
            PositionError::Clock(value) => write!(f, "Invalid move counter: {}", value),
        }
    }
}

impl std::error::Error for PositionError {}

/// A fully parsed FEN record.
///
/// Stored as its FEN string, so every consumer works with typed fields and
/// the text is only split once on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Position {
    pub placement: String,
    pub side_to_move: Side,
    pub castling: String,
    pub en_passant: Option<String>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Position {
    pub fn starting() -> Self {
        Self {
            placement: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR".to_string(),
            side_to_move: Side::White,
            castling: "KQkq".to_string(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Piece letters on the board, in placement order.
    pub fn pieces(&self) -> impl Iterator<Item = char> + '_ {
        self.placement.chars().filter(|c| c.is_ascii_alphabetic())
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::starting()
    }
}

fn parse_placement(placement: &str) -> Result<(), PositionError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(PositionError::Placement(format!(
            "expected 8 ranks, found {}",
            ranks.len()
        )));
    }
    for rank in ranks {
        let mut files = 0;
        for c in rank.chars() {
            match c {
                '1'..='8' => files += c as u32 - '0' as u32,
                'p' | 'n' | 'b' | 'r' | 'q' | 'k' | 'P' | 'N' | 'B' | 'R' | 'Q' | 'K' => files += 1,
                other => {
                    return Err(PositionError::Placement(format!(
                        "unexpected character '{}'",
                        other
                    )))
                }
            }
        }
        if files != 8 {
            return Err(PositionError::Placement(format!(
                "rank '{}' covers {} files",
                rank, files
            )));
        }
    }
    Ok(())
}

fn is_square(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 2 && (b'a'..=b'h').contains(&bytes[0]) && (b'1'..=b'8').contains(&bytes[1])
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(PositionError::FieldCount(fields.len()));
        }

        parse_placement(fields[0])?;

        let side_to_move = match fields[1] {
            "w" => Side::White,
            "b" => Side::Black,
            other => return Err(PositionError::SideToMove(other.to_string())),
        };

        let castling = fields[2];
        if castling != "-" && !castling.chars().all(|c| "KQkq".contains(c)) {
            return Err(PositionError::Castling(castling.to_string()));
        }

        let en_passant = match fields[3] {
            "-" => None,
            square if is_square(square) => Some(square.to_string()),
            other => return Err(PositionError::EnPassant(other.to_string())),
        };

        let halfmove_clock = fields[4]
            .parse()
            .map_err(|_| PositionError::Clock(fields[4].to_string()))?;
        let fullmove_number = fields[5]
            .parse()
            .map_err(|_| PositionError::Clock(fields[5].to_string()))?;

        Ok(Position {
            placement: fields[0].to_string(),
            side_to_move,
            castling: castling.to_string(),
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side_to_move {
            Side::White => "w",
            Side::Black => "b",
        };
        write!(
            f,
            "{} {} {} {} {} {}",
            self.placement,
            side,
            self.castling,
            self.en_passant.as_deref().unwrap_or("-"),
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

impl TryFrom<String> for Position {
    type Error = PositionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.to_string()
    }
}

/// The position handed to the engine: a FEN plus the moves played on top of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionDirective {
    pub fen: Position,
    pub moves: Vec<String>,
}

impl PositionDirective {
    pub fn new(fen: Position) -> Self {
        Self { fen, moves: vec![] }
    }
}

impl fmt::Display for PositionDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fen {}", self.fen)?;
        if !self.moves.is_empty() {
            write!(f, " moves {}", self.moves.join(" "))?;
        }
        Ok(())
    }
}
