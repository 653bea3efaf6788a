//! Elo rating updates.
//!
//! Both deltas of a game come from the same pre-game rating pair, so the
//! order in which the two players are written back does not matter.

use std::sync::Arc;

use tracing::info;

use crate::models::game::{Game, Winner};
use crate::models::position::Side;
use crate::models::user::User;
use crate::repositories::errors::user_repository_errors::UserRepositoryError;
use crate::repositories::user_repository::UserRepository;
use crate::services::errors::game_service_errors::GameServiceError;

pub const K_FACTOR: f64 = 32.0;

/// Rating assumed for the bot at each skill level, `600 + 150 * level`.
pub const BOT_RATINGS: [i32; 21] = [
    600, 750, 900, 1050, 1200, 1350, 1500, 1650, 1800, 1950, 2100, 2250, 2400, 2550, 2700, 2850,
    3000, 3150, 3300, 3450, 3600,
];

pub fn bot_difficulty_to_rating(difficulty: u8) -> Option<i32> {
    BOT_RATINGS.get(usize::from(difficulty)).copied()
}

fn expected_score(rating: i32, opponent_rating: i32) -> f64 {
    1.0 / (1.0 + 10_f64.powf(f64::from(opponent_rating - rating) / 400.0))
}

/// Rating change for a player scoring `score` (1.0 win, 0.5 draw, 0.0 loss).
pub fn rating_delta(rating: i32, opponent_rating: i32, score: f64) -> i32 {
    (K_FACTOR * (score - expected_score(rating, opponent_rating))).round() as i32
}

fn score_for(side: Side, winner: Winner) -> f64 {
    match (side, winner) {
        (_, Winner::Draw) => 0.5,
        (Side::White, Winner::White) | (Side::Black, Winner::Black) => 1.0,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingDeltas {
    pub white: i32,
    pub black: i32,
}

pub fn rating_deltas(white_rating: i32, black_rating: i32, winner: Winner) -> RatingDeltas {
    RatingDeltas {
        white: rating_delta(white_rating, black_rating, score_for(Side::White, winner)),
        black: rating_delta(black_rating, white_rating, score_for(Side::Black, winner)),
    }
}

/// One side of a finished game.
#[derive(Debug, Clone, PartialEq)]
pub enum Participant {
    Human(User),
    /// Synthesized from the difficulty table and never stored.
    Bot { rating: i32 },
}

impl Participant {
    pub fn rating(&self) -> i32 {
        match self {
            Participant::Human(user) => user.rating,
            Participant::Bot { rating } => *rating,
        }
    }

    fn adjust(&mut self, delta: i32) {
        match self {
            Participant::Human(user) => user.rating += delta,
            Participant::Bot { rating } => *rating += delta,
        }
    }

    pub fn into_user(self) -> Option<User> {
        match self {
            Participant::Human(user) => Some(user),
            Participant::Bot { .. } => None,
        }
    }
}

pub fn apply_result(white: &mut Participant, black: &mut Participant, winner: Winner) -> RatingDeltas {
    let deltas = rating_deltas(white.rating(), black.rating(), winner);
    white.adjust(deltas.white);
    black.adjust(deltas.black);
    deltas
}

/// Loads and re-rates the players of finished games.
pub struct RatingService {
    user_repository: Arc<dyn UserRepository + Send + Sync>,
}

impl RatingService {
    pub fn new(user_repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        RatingService { user_repository }
    }

    pub async fn load_participant(
        &self,
        game: &Game,
        side: Side,
    ) -> Result<Participant, GameServiceError> {
        match game.player(side) {
            Some(username) => self
                .user_repository
                .get_user(username)
                .await
                .map(Participant::Human)
                .map_err(|e| match e {
                    UserRepositoryError::NotFound => {
                        GameServiceError::UserNotFound(username.to_string())
                    }
                    other => GameServiceError::UserRepository(other),
                }),
            None => {
                let difficulty = game.bot_difficulty.ok_or_else(|| {
                    GameServiceError::InvalidGame("bot side without a difficulty".to_string())
                })?;
                bot_difficulty_to_rating(difficulty)
                    .map(|rating| Participant::Bot { rating })
                    .ok_or(GameServiceError::InvalidBotDifficulty(difficulty))
            }
        }
    }

    /// Computes the post-game users to store. Bots are dropped.
    pub async fn settle(&self, game: &Game, winner: Winner) -> Result<Vec<User>, GameServiceError> {
        let mut white = self.load_participant(game, Side::White).await?;
        let mut black = self.load_participant(game, Side::Black).await?;

        let deltas = apply_result(&mut white, &mut black, winner);
        info!(
            "Game {} settled as {:?}: white {:+}, black {:+}",
            game.game_id, winner, deltas.white, deltas.black
        );

        Ok([white, black]
            .into_iter()
            .filter_map(Participant::into_user)
            .collect())
    }

    pub async fn save(&self, users: &[User]) -> Result<(), GameServiceError> {
        for user in users {
            self.user_repository
                .save_user(user)
                .await
                .map_err(GameServiceError::UserRepository)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::MockUserRepository;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 600)]
    #[case(5, 1350)]
    #[case(10, 2100)]
    #[case(20, 3600)]
    fn test_bot_difficulty_to_rating(#[case] difficulty: u8, #[case] expected: i32) {
        assert_eq!(bot_difficulty_to_rating(difficulty), Some(expected));
    }

    #[test]
    fn test_bot_table_is_linear() {
        for difficulty in 0..=20u8 {
            assert_eq!(
                bot_difficulty_to_rating(difficulty),
                Some(600 + 150 * i32::from(difficulty))
            );
        }
        assert_eq!(bot_difficulty_to_rating(21), None);
    }

    #[rstest]
    #[case(1500, 1500, 1.0, 16)]
    #[case(1500, 1500, 0.0, -16)]
    #[case(1500, 1500, 0.5, 0)]
    #[case(1200, 1350, 1.0, 23)]
    #[case(1350, 1200, 0.0, -23)]
    #[case(1200, 1350, 0.5, 7)]
    fn test_rating_delta(
        #[case] rating: i32,
        #[case] opponent: i32,
        #[case] score: f64,
        #[case] expected: i32,
    ) {
        assert_eq!(rating_delta(rating, opponent, score), expected);
    }

    #[test]
    fn test_deltas_use_pre_game_ratings() {
        let deltas = rating_deltas(1200, 1350, Winner::White);
        assert_eq!(deltas, RatingDeltas { white: 23, black: -23 });

        let mut white = Participant::Human(User::with_rating("alice", 1200));
        let mut black = Participant::Bot { rating: 1350 };
        apply_result(&mut white, &mut black, Winner::White);

        assert_eq!(white.rating(), 1223);
        assert_eq!(black.rating(), 1327);
    }

    #[test]
    fn test_draw_between_equals_changes_nothing() {
        assert_eq!(
            rating_deltas(1800, 1800, Winner::Draw),
            RatingDeltas { white: 0, black: 0 }
        );
    }

    proptest! {
        #[test]
        fn prop_delta_bounded_by_k(a in 100i32..3600, b in 100i32..3600, score in prop_oneof![Just(0.0), Just(0.5), Just(1.0)]) {
            prop_assert!(rating_delta(a, b, score).abs() <= K_FACTOR as i32);
        }

        #[test]
        fn prop_equal_ratings_reward_winner(rating in 100i32..3600) {
            let deltas = rating_deltas(rating, rating, Winner::Black);
            prop_assert!(deltas.black > 0);
            prop_assert!(deltas.white < 0);
        }

        #[test]
        fn prop_deltas_independent_of_side_order(a in 100i32..3600, b in 100i32..3600) {
            let forward = rating_deltas(a, b, Winner::White);
            let mirrored = rating_deltas(b, a, Winner::Black);
            prop_assert_eq!(forward.white, mirrored.black);
            prop_assert_eq!(forward.black, mirrored.white);
        }
    }

    #[tokio::test]
    async fn test_settle_drops_bot_participant() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_get_user()
            .times(1)
            .returning(|username| {
                assert_eq!(username, "alice");
                Ok(User::with_rating("alice", 1200))
            });
        let service = RatingService::new(Arc::new(repository));
        let game = Game::versus_bot("alice", Side::Black, 5);

        let users = service.settle(&game, Winner::Black).await.unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "alice");
        assert_eq!(users[0].rating, 1223);
    }

    #[tokio::test]
    async fn test_settle_two_players() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_get_user()
            .returning(|username| Ok(User::with_rating(username, 1500)));
        let service = RatingService::new(Arc::new(repository));
        let game = Game::versus_player("alice", "bob");

        let users = service.settle(&game, Winner::Draw).await.unwrap();

        assert_eq!(users.len(), 2);
        assert!(users.iter().all(|user| user.rating == 1500));
    }

    #[tokio::test]
    async fn test_settle_reports_missing_user() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_get_user()
            .returning(|_| Err(UserRepositoryError::NotFound));
        let service = RatingService::new(Arc::new(repository));
        let game = Game::versus_player("alice", "bob");

        let result = service.settle(&game, Winner::White).await;

        assert!(matches!(result, Err(GameServiceError::UserNotFound(name)) if name == "alice"));
    }

    #[tokio::test]
    async fn test_invalid_bot_difficulty() {
        let service = RatingService::new(Arc::new(MockUserRepository::new()));
        let mut game = Game::versus_bot("alice", Side::White, 5);
        game.bot_difficulty = Some(42);

        let result = service.load_participant(&game, Side::Black).await;

        assert!(matches!(result, Err(GameServiceError::InvalidBotDifficulty(42))));
    }
}
