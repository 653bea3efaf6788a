use std::fmt;

use crate::engine::EngineError;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::errors::user_repository_errors::UserRepositoryError;
use crate::services::game_outcome_service::StatusDumpError;

#[derive(Debug)]
pub enum GameServiceError {
    ValidationError(String),
    GameNotFound(String),
    GameInactive(String),
    NotYourTurn(String),
    IllegalMove {
        attempted: String,
        legal_moves: Vec<String>,
    },
    NotAParticipant(String),
    UserNotFound(String),
    InvalidGame(String),
    InvalidBotDifficulty(u8),
    EngineUnavailable,
    Engine(EngineError),
    StatusDump(StatusDumpError),
    GameRepository(GameRepositoryError),
    UserRepository(UserRepositoryError),
}

impl fmt::Display for GameServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            GameServiceError::GameNotFound(id) => write!(f, "There is no game with ID {}", id),
            GameServiceError::GameInactive(id) => write!(f, "Game {} is inactive", id),
            GameServiceError::NotYourTurn(id) => {
                write!(f, "Game {} is waiting for the bot to move", id)
            }
            GameServiceError::IllegalMove {
                attempted,
                legal_moves,
            } => write!(
                f,
                "That is not a legal move: {} (legal moves: [{}])",
                attempted,
                legal_moves.join(", ")
            ),
            GameServiceError::NotAParticipant(username) => {
                write!(f, "{} is not playing this game", username)
            }
            GameServiceError::UserNotFound(username) => {
                write!(f, "A player with username {} does not exist", username)
            }
            GameServiceError::InvalidGame(msg) => write!(f, "Invalid game record: {}", msg),
            GameServiceError::InvalidBotDifficulty(level) => {
                write!(f, "Bot difficulty {} is outside 0-20", level)
            }
            GameServiceError::EngineUnavailable => write!(f, "Engine failed to start"),
            GameServiceError::Engine(err) => write!(f, "{}", err),
            GameServiceError::StatusDump(err) => write!(f, "{}", err),
            GameServiceError::GameRepository(err) => write!(f, "Game repository error: {}", err),
            GameServiceError::UserRepository(err) => write!(f, "User repository error: {}", err),
        }
    }
}

impl std::error::Error for GameServiceError {}

impl From<EngineError> for GameServiceError {
    fn from(err: EngineError) -> Self {
        GameServiceError::Engine(err)
    }
}

impl From<StatusDumpError> for GameServiceError {
    fn from(err: StatusDumpError) -> Self {
        GameServiceError::StatusDump(err)
    }
}

impl From<GameRepositoryError> for GameServiceError {
    fn from(err: GameRepositoryError) -> Self {
        GameServiceError::GameRepository(err)
    }
}

impl From<UserRepositoryError> for GameServiceError {
    fn from(err: UserRepositoryError) -> Self {
        GameServiceError::UserRepository(err)
    }
}
