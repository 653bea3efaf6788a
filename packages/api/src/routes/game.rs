use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use lambda_http::tracing::{debug, warn};
use serde::{Deserialize, Serialize};
use shared::models::game::Game;
use shared::models::requests::CreateGameRequest;
use shared::services::move_service::MoveOutcome;

use crate::{error::ApiError, middleware::auth::AuthenticatedUser, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/game", post(create_game))
        .route("/game/{game_id}", get(get_game))
        .route("/game/resign/{game_id}", put(resign))
        .route("/move/{move}", get(submit_move))
}

#[derive(Debug, Deserialize)]
pub struct MoveQuery {
    #[serde(rename = "gameId")]
    pub game_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub game: Game,
}

async fn create_game(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Json(request): Json<CreateGameRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let game = state
        .game_service
        .create_game(&authenticated_user.username, &request)
        .await
        .map_err(|e| {
            warn!(
                "Game creation by {} failed: {}",
                authenticated_user.username, e
            );
            ApiError::from(e)
        })?;
    Ok(Json(GameResponse { game }))
}

async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let game = state.game_service.get_game(&game_id).await?;
    Ok(Json(GameResponse { game }))
}

async fn submit_move(
    State(state): State<AppState>,
    Path(move_token): Path<String>,
    Query(query): Query<MoveQuery>,
) -> Result<Json<MoveOutcome>, ApiError> {
    let game_id = query.game_id.unwrap_or_default();
    debug!("Move {} submitted for game {}", move_token, game_id);

    state
        .move_service
        .submit_move(&game_id, &move_token)
        .await
        .map(Json)
        .map_err(|e| {
            warn!("Move {} rejected for game {}: {}", move_token, game_id, e);
            ApiError::from(e)
        })
}

async fn resign(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    authenticated_user: AuthenticatedUser,
) -> Result<Json<GameResponse>, ApiError> {
    let game = state
        .resign_service
        .resign(&game_id, &authenticated_user.username)
        .await
        .map_err(|e| {
            warn!(
                "Resignation by {} failed for game {}: {}",
                authenticated_user.username, game_id, e
            );
            ApiError::from(e)
        })?;
    Ok(Json(GameResponse { game }))
}
