use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::position::{Position, PositionDirective, Side};

pub const STARTING_LEGAL_MOVES: [&str; 20] = [
    "a2a3", "b2b3", "c2c3", "d2d3", "e2e3", "f2f3", "g2g3", "h2h3", "a2a4", "b2b4", "c2c4", "d2d4",
    "e2e4", "f2f4", "g2g4", "h2h4", "b1a3", "b1c3", "g1f3", "g1h3",
];

pub const MAX_BOT_DIFFICULTY: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    White,
    Black,
    Draw,
}

impl From<Side> for Winner {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Winner::White,
            Side::Black => Winner::Black,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Checkmate,
    Stalemate,
    FiftyMoveRule,
    InsufficientMaterial,
    Resignation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub winner: Winner,
    pub termination: Termination,
}

/// A single step in a game's life. Folded into a [`Game`] with [`Game::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    MovePlayed(String),
    PositionEvaluated {
        position: Position,
        legal_moves: Vec<String>,
        outcome: Option<Outcome>,
    },
    Resigned(Side),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub game_id: String,
    pub active: bool,
    pub winner: Option<Winner>,
    pub termination: Option<Termination>,
    pub position: Position,
    /// Moves played on top of `position` that the engine has not folded in yet.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending_moves: Vec<String>,
    pub move_history: Vec<String>,
    pub legal_moves: Vec<String>,
    pub white_player: Option<String>,
    pub black_player: Option<String>,
    pub bot_difficulty: Option<u8>,
    pub created_at: DateTime<Utc>,
}

impl Game {
    fn new(
        white_player: Option<String>,
        black_player: Option<String>,
        bot_difficulty: Option<u8>,
    ) -> Self {
        Game {
            game_id: Uuid::new_v4().to_string(),
            active: true,
            winner: None,
            termination: None,
            position: Position::starting(),
            pending_moves: vec![],
            move_history: vec![],
            legal_moves: STARTING_LEGAL_MOVES.iter().map(|m| m.to_string()).collect(),
            white_player,
            black_player,
            bot_difficulty,
            created_at: Utc::now(),
        }
    }

    pub fn versus_player(white_player: &str, black_player: &str) -> Self {
        Game::new(
            Some(white_player.to_string()),
            Some(black_player.to_string()),
            None,
        )
    }

    pub fn versus_bot(player: &str, player_side: Side, bot_difficulty: u8) -> Self {
        match player_side {
            Side::White => Game::new(Some(player.to_string()), None, Some(bot_difficulty)),
            Side::Black => Game::new(None, Some(player.to_string()), Some(bot_difficulty)),
        }
    }

    /// Checks the player/bot invariants of a stored record.
    pub fn validate(&self) -> Result<(), String> {
        match (&self.white_player, &self.black_player, self.bot_difficulty) {
            (Some(_), Some(_), None) => Ok(()),
            (Some(_), None, Some(d)) | (None, Some(_), Some(d)) if d <= MAX_BOT_DIFFICULTY => {
                Ok(())
            }
            (Some(_), None, Some(d)) | (None, Some(_), Some(d)) => {
                Err(format!("bot difficulty {} is outside 0-{}", d, MAX_BOT_DIFFICULTY))
            }
            (None, None, _) => Err("game has no human player".to_string()),
            (Some(_), Some(_), Some(_)) => {
                Err("bot difficulty set on a game between two players".to_string())
            }
            (_, _, None) => Err("bot difficulty missing for a game against the bot".to_string()),
        }
    }

    pub fn player(&self, side: Side) -> Option<&str> {
        match side {
            Side::White => self.white_player.as_deref(),
            Side::Black => self.black_player.as_deref(),
        }
    }

    /// The side played by `username`, when it matches exactly one seat.
    pub fn side_of(&self, username: &str) -> Option<Side> {
        let white = self.white_player.as_deref() == Some(username);
        let black = self.black_player.as_deref() == Some(username);
        match (white, black) {
            (true, false) => Some(Side::White),
            (false, true) => Some(Side::Black),
            _ => None,
        }
    }

    /// True when the bot holds the side to move and has not played yet.
    pub fn awaiting_bot(&self) -> bool {
        self.active
            && self.bot_difficulty.is_some()
            && self.player(self.position.side_to_move).is_none()
    }

    pub fn directive(&self) -> PositionDirective {
        PositionDirective {
            fen: self.position.clone(),
            moves: self.pending_moves.clone(),
        }
    }

    pub fn apply(mut self, event: GameEvent) -> Game {
        if !self.active {
            return self;
        }

        match event {
            GameEvent::MovePlayed(token) => {
                self.pending_moves.push(token.clone());
                self.move_history.push(token);
            }
            GameEvent::PositionEvaluated {
                position,
                legal_moves,
                outcome,
            } => {
                self.position = position;
                self.pending_moves.clear();
                match outcome {
                    Some(outcome) => self.conclude(outcome),
                    None => self.legal_moves = legal_moves,
                }
            }
            GameEvent::Resigned(side) => self.conclude(Outcome {
                winner: side.opponent().into(),
                termination: Termination::Resignation,
            }),
        }
        self
    }

    fn conclude(&mut self, outcome: Outcome) {
        self.active = false;
        self.winner = Some(outcome.winner);
        self.termination = Some(outcome.termination);
        self.legal_moves.clear();
    }
}
