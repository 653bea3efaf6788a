use std::sync::Arc;

use tracing::{info, warn};

use crate::models::game::{Game, GameEvent};
use crate::repositories::game_repository::GameRepository;
use crate::services::errors::game_service_errors::GameServiceError;
use crate::services::rating_service::RatingService;

pub struct ResignService {
    game_repository: Arc<dyn GameRepository + Send + Sync>,
    rating_service: Arc<RatingService>,
}

impl ResignService {
    pub fn new(
        game_repository: Arc<dyn GameRepository + Send + Sync>,
        rating_service: Arc<RatingService>,
    ) -> Self {
        ResignService {
            game_repository,
            rating_service,
        }
    }

    /// Ends the game in favour of `username`'s opponent.
    pub async fn resign(&self, game_id: &str, username: &str) -> Result<Game, GameServiceError> {
        if game_id.is_empty() || username.is_empty() {
            return Err(GameServiceError::ValidationError(format!(
                "Missing one or more required fields: gameId={{{}}}, username={{{}}}",
                game_id, username
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

        let side = game.side_of(username).ok_or_else(|| {
            warn!("{} tried to resign game {} without playing in it", username, game_id);
            GameServiceError::NotAParticipant(username.to_string())
        })?;

        // Settling loads the resigning user, so a missing record surfaces as
        // UserNotFound before anything is written.
        let game = game.apply(GameEvent::Resigned(side));
        if let Some(winner) = game.winner {
            let users = self.rating_service.settle(&game, winner).await?;
            self.rating_service.save(&users).await?;
        }
        self.game_repository.save_game(&game).await?;

        info!("{} resigned game {} as {}", username, game.game_id, side);
        Ok(game)
    }
}
