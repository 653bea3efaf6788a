use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lambda_http::tracing::error;
use serde_json::json;
use shared::services::errors::{
    auth_service_errors::AuthServiceError, game_service_errors::GameServiceError,
};

#[derive(Debug)]
pub enum ApiError {
    GameService(GameServiceError),
    AuthService(AuthServiceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::GameService(
                GameServiceError::ValidationError(_)
                | GameServiceError::GameInactive(_)
                | GameServiceError::NotYourTurn(_)
                | GameServiceError::IllegalMove { .. }
                | GameServiceError::InvalidBotDifficulty(_),
            ) => StatusCode::BAD_REQUEST,
            ApiError::GameService(
                GameServiceError::GameNotFound(_) | GameServiceError::UserNotFound(_),
            ) => StatusCode::NOT_FOUND,
            ApiError::GameService(GameServiceError::NotAParticipant(_)) => StatusCode::FORBIDDEN,
            ApiError::GameService(
                GameServiceError::InvalidGame(_)
                | GameServiceError::EngineUnavailable
                | GameServiceError::Engine(_)
                | GameServiceError::StatusDump(_)
                | GameServiceError::GameRepository(_)
                | GameServiceError::UserRepository(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,

            ApiError::AuthService(
                AuthServiceError::MissingToken
                | AuthServiceError::InvalidToken
                | AuthServiceError::ExpiredToken,
            ) => StatusCode::UNAUTHORIZED,
            ApiError::AuthService(AuthServiceError::JwtError(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::GameService(err) => write!(f, "{}", err),
            ApiError::AuthService(err) => write!(f, "{}", err),
        }
    }
}

impl From<GameServiceError> for ApiError {
    fn from(error: GameServiceError) -> Self {
        ApiError::GameService(error)
    }
}

impl From<AuthServiceError> for ApiError {
    fn from(error: AuthServiceError) -> Self {
        ApiError::AuthService(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
