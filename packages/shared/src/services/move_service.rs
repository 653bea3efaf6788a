use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::engine::{Engine, EngineLauncher};
use crate::models::game::{Game, GameEvent};
use crate::repositories::game_repository::GameRepository;
use crate::services::errors::game_service_errors::GameServiceError;
use crate::services::game_outcome_service::{self, PositionStatus};
use crate::services::rating_service::RatingService;

/// Upper bound on lines read for one `d` status dump.
pub const STATUS_DUMP_LINES: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveOutcome {
    pub game: Game,
    #[serde(rename = "move")]
    pub engine_move: Option<String>,
}

pub struct MoveService {
    game_repository: Arc<dyn GameRepository + Send + Sync>,
    rating_service: Arc<RatingService>,
    engine_launcher: Arc<dyn EngineLauncher>,
    think_time_ms: u64,
}

impl MoveService {
    pub fn new(
        game_repository: Arc<dyn GameRepository + Send + Sync>,
        rating_service: Arc<RatingService>,
        engine_launcher: Arc<dyn EngineLauncher>,
        think_time_ms: u64,
    ) -> Self {
        MoveService {
            game_repository,
            rating_service,
            engine_launcher,
            think_time_ms,
        }
    }

    /// Plays `move_token` in the game, lets the engine answer unless the game
    /// just ended, and stores the result.
    pub async fn submit_move(
        &self,
        game_id: &str,
        move_token: &str,
    ) -> Result<MoveOutcome, GameServiceError> {
        if game_id.is_empty() || move_token.is_empty() {
            return Err(GameServiceError::ValidationError(format!(
                "Missing one or more required fields: move={{{}}}, gameId={{{}}}",
                move_token, game_id
            )));
        }

        let game = self
            .game_repository
            .get_game(game_id)
            .await?
            .ok_or_else(|| GameServiceError::GameNotFound(game_id.to_string()))?;
        if !game.active {
            return Err(GameServiceError::GameInactive(game_id.to_string()));
        }
        game.validate().map_err(GameServiceError::InvalidGame)?;
        if game.awaiting_bot() {
            return Err(GameServiceError::NotYourTurn(game_id.to_string()));
        }
        if !game.legal_moves.iter().any(|legal| legal == move_token) {
            return Err(GameServiceError::IllegalMove {
                attempted: move_token.to_string(),
                legal_moves: game.legal_moves,
            });
        }

        let mut engine = self.engine_launcher.launch();
        if !engine.start().await {
            error!("Engine failed to start for game {}", game_id);
            engine.stop().await;
            return Err(GameServiceError::EngineUnavailable);
        }
        let played = self.play_turn(engine.as_mut(), game, move_token).await;
        engine.stop().await;
        let (game, engine_move) = played?;

        let users = match game.winner {
            Some(winner) => self.rating_service.settle(&game, winner).await?,
            None => vec![],
        };
        self.rating_service.save(&users).await?;
        self.game_repository.save_game(&game).await?;

        info!(
            "Game {}: played {}, engine replied {:?}, active={}",
            game.game_id, move_token, engine_move, game.active
        );
        Ok(MoveOutcome { game, engine_move })
    }

    async fn play_turn(
        &self,
        engine: &mut dyn Engine,
        game: Game,
        move_token: &str,
    ) -> Result<(Game, Option<String>), GameServiceError> {
        configure_skill(engine, &game).await?;

        let game = game.apply(GameEvent::MovePlayed(move_token.to_string()));
        let game = evaluate_position(engine, game).await?;
        if !game.active {
            debug!("Game {} ended on the player's move", game.game_id);
            return Ok((game, None));
        }

        let (game, reply) = play_engine_move(engine, game, self.think_time_ms).await?;
        Ok((game, Some(reply)))
    }
}

/// Sets the engine's strength for bot games. Games between two players keep
/// the engine's defaults.
pub async fn configure_skill(engine: &mut dyn Engine, game: &Game) -> Result<(), GameServiceError> {
    if let Some(difficulty) = game.bot_difficulty {
        engine
            .send_command(&format!("setoption name Skill Level value {}", difficulty))
            .await?;
    }
    Ok(())
}

/// Lets the engine move for the side to move and re-evaluates the result.
pub async fn play_engine_move(
    engine: &mut dyn Engine,
    game: Game,
    think_time_ms: u64,
) -> Result<(Game, String), GameServiceError> {
    let reply = engine.best_move(&game.directive(), think_time_ms).await?;
    let game = game.apply(GameEvent::MovePlayed(reply.clone()));
    let game = evaluate_position(engine, game).await?;
    Ok((game, reply))
}

/// Has the engine canonicalize the game's position and folds the verdict in.
pub async fn evaluate_position(
    engine: &mut dyn Engine,
    game: Game,
) -> Result<Game, GameServiceError> {
    let directive = game.directive();
    let legal_moves = engine.legal_moves(&directive).await?;

    engine
        .send_command(&format!("position {}", directive))
        .await?;
    engine.send_command("d").await?;
    let dump = engine.read_output(STATUS_DUMP_LINES).await?;
    let status = PositionStatus::from_dump(&dump)?;

    let outcome = game_outcome_service::evaluate(&status, &legal_moves);
    if let Some(outcome) = outcome {
        info!(
            "Game {} over by {:?}, winner {:?}",
            game.game_id, outcome.termination, outcome.winner
        );
    }

    Ok(game.apply(GameEvent::PositionEvaluated {
        position: status.position,
        legal_moves,
        outcome,
    }))
}
