use std::sync::Arc;

use tracing::debug;

use crate::models::user::PublicProfile;
use crate::repositories::errors::user_repository_errors::UserRepositoryError;
use crate::repositories::user_repository::UserRepository;
use crate::services::errors::game_service_errors::GameServiceError;

pub struct UserService {
    user_repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(user_repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        UserService { user_repository }
    }

    pub async fn get_public_profile(&self, username: &str) -> Result<PublicProfile, GameServiceError> {
        if username.is_empty() {
            return Err(GameServiceError::ValidationError(
                "Missing required field username".to_string(),
            ));
        }

        let user = self
            .user_repository
            .get_user(username)
            .await
            .map_err(|e| match e {
                UserRepositoryError::NotFound => GameServiceError::UserNotFound(username.to_string()),
                other => GameServiceError::UserRepository(other),
            })?;
        debug!("Loaded public profile for {}", username);
        Ok(user.into())
    }
}
