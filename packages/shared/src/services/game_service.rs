use std::sync::Arc;

use tracing::{error, info};

use crate::engine::{Engine, EngineLauncher};
use crate::models::game::{Game, MAX_BOT_DIFFICULTY};
use crate::models::position::Side;
use crate::models::requests::CreateGameRequest;
use crate::repositories::errors::user_repository_errors::UserRepositoryError;
use crate::repositories::game_repository::GameRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::errors::game_service_errors::GameServiceError;
use crate::services::move_service::{configure_skill, play_engine_move};

/// Creates and looks up games.
pub struct GameService {
    game_repository: Arc<dyn GameRepository + Send + Sync>,
    user_repository: Arc<dyn UserRepository + Send + Sync>,
    engine_launcher: Arc<dyn EngineLauncher>,
    think_time_ms: u64,
}

impl GameService {
    pub fn new(
        game_repository: Arc<dyn GameRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        engine_launcher: Arc<dyn EngineLauncher>,
        think_time_ms: u64,
    ) -> Self {
        GameService {
            game_repository,
            user_repository,
            engine_launcher,
            think_time_ms,
        }
    }

    /// Seats `username` against another user or the bot. When the bot takes
    /// white it plays its first move before the game is stored.
    pub async fn create_game(
        &self,
        username: &str,
        request: &CreateGameRequest,
    ) -> Result<Game, GameServiceError> {
        if username.is_empty() {
            return Err(GameServiceError::ValidationError(
                "Missing the creating user".to_string(),
            ));
        }
        self.require_user(username).await?;

        let creator_side = if request.auth_user_white {
            Side::White
        } else {
            Side::Black
        };

        let game = match (request.other_user_id.as_deref(), request.bot_difficulty) {
            (Some(other), None) => {
                if other.is_empty() || other == username {
                    return Err(GameServiceError::ValidationError(format!(
                        "Cannot start a game against '{}'",
                        other
                    )));
                }
                self.require_user(other).await?;
                match creator_side {
                    Side::White => Game::versus_player(username, other),
                    Side::Black => Game::versus_player(other, username),
                }
            }
            (None, Some(difficulty)) => {
                if difficulty > MAX_BOT_DIFFICULTY {
                    return Err(GameServiceError::InvalidBotDifficulty(difficulty));
                }
                Game::versus_bot(username, creator_side, difficulty)
            }
            _ => {
                return Err(GameServiceError::ValidationError(
                    "Provide exactly one of otherUserId or botDifficulty".to_string(),
                ))
            }
        };

        let game = if game.awaiting_bot() {
            self.open_for_bot(game).await?
        } else {
            game
        };
        self.game_repository.save_game(&game).await?;

        info!(
            "{} created game {} as {}",
            username, game.game_id, creator_side
        );
        Ok(game)
    }

    pub async fn get_game(&self, game_id: &str) -> Result<Game, GameServiceError> {
        if game_id.is_empty() {
            return Err(GameServiceError::ValidationError(
                "Missing required field gameId".to_string(),
            ));
        }
        self.game_repository
            .get_game(game_id)
            .await?
            .ok_or_else(|| GameServiceError::GameNotFound(game_id.to_string()))
    }

    async fn require_user(&self, username: &str) -> Result<(), GameServiceError> {
        self.user_repository
            .get_user(username)
            .await
            .map(|_| ())
            .map_err(|e| match e {
                UserRepositoryError::NotFound => GameServiceError::UserNotFound(username.to_string()),
                other => GameServiceError::UserRepository(other),
            })
    }

    async fn open_for_bot(&self, game: Game) -> Result<Game, GameServiceError> {
        let mut engine = self.engine_launcher.launch();
        if !engine.start().await {
            error!("Engine failed to start for new game {}", game.game_id);
            engine.stop().await;
            return Err(GameServiceError::EngineUnavailable);
        }
        let opened = bot_opening(engine.as_mut(), game, self.think_time_ms).await;
        engine.stop().await;
        let (game, reply) = opened?;

        info!("Bot opened game {} with {}", game.game_id, reply);
        Ok(game)
    }
}

async fn bot_opening(
    engine: &mut dyn Engine,
    game: Game,
    think_time_ms: u64,
) -> Result<(Game, String), GameServiceError> {
    configure_skill(engine, &game).await?;
    play_engine_move(engine, game, think_time_ms).await
}
