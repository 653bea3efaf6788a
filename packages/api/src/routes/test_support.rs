use std::sync::Arc;

use axum_test::TestServer;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use shared::engine::board::BoardEngineLauncher;
use shared::models::auth::TokenClaims;
use shared::models::game::Game;
use shared::models::user::User;
use shared::repositories::memory::{InMemoryGameRepository, InMemoryUserRepository};

use crate::create_app;
use crate::state::AppState;

pub const SECRET: &str = "test-secret-key";

/// App over in-memory stores holding `games` and the users alice, bob and carol.
pub fn server(games: Vec<Game>) -> TestServer {
    let state = AppState::new(
        Arc::new(InMemoryGameRepository::with_games(games)),
        Arc::new(InMemoryUserRepository::with_users([
            User::new("alice"),
            User::with_rating("bob", 1350),
            User::new("carol"),
        ])),
        Arc::new(BoardEngineLauncher),
        10,
        SECRET.to_string(),
    );
    TestServer::new(create_app(state)).unwrap()
}

pub fn bearer(username: &str) -> String {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: username.to_string(),
        exp: (now + Duration::hours(1)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_ref()),
    )
    .unwrap();
    format!("Bearer {}", token)
}
