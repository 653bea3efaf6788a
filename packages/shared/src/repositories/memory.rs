//! Process-local repositories for local runs and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::game::Game;
use crate::models::user::User;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::errors::user_repository_errors::UserRepositoryError;
use crate::repositories::game_repository::GameRepository;
use crate::repositories::user_repository::UserRepository;

#[derive(Default)]
pub struct InMemoryGameRepository {
    games: Mutex<HashMap<String, Game>>,
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_games(games: impl IntoIterator<Item = Game>) -> Self {
        let games = games
            .into_iter()
            .map(|game| (game.game_id.clone(), game))
            .collect();
        Self {
            games: Mutex::new(games),
        }
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    async fn get_game(&self, game_id: &str) -> Result<Option<Game>, GameRepositoryError> {
        let games = self
            .games
            .lock()
            .map_err(|e| GameRepositoryError::Storage(e.to_string()))?;
        Ok(games.get(game_id).cloned())
    }

    async fn save_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        let mut games = self
            .games
            .lock()
            .map_err(|e| GameRepositoryError::Storage(e.to_string()))?;
        games.insert(game.game_id.clone(), game.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.username.clone(), user))
            .collect();
        Self {
            users: Mutex::new(users),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_user(&self, username: &str) -> Result<User, UserRepositoryError> {
        let users = self
            .users
            .lock()
            .map_err(|e| UserRepositoryError::Storage(e.to_string()))?;
        users.get(username).cloned().ok_or(UserRepositoryError::NotFound)
    }

    async fn save_user(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut users = self
            .users
            .lock()
            .map_err(|e| UserRepositoryError::Storage(e.to_string()))?;
        users.insert(user.username.clone(), user.clone());
        Ok(())
    }
}
