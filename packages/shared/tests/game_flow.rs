//! End-to-end game flows against in-memory storage and the board engine.

use std::sync::Arc;

use anyhow::Result;
use shared::engine::board::BoardEngineLauncher;
use shared::models::game::{Game, Termination, Winner, STARTING_LEGAL_MOVES};
use shared::models::position::Side;
use shared::models::requests::CreateGameRequest;
use shared::models::user::User;
use shared::repositories::game_repository::GameRepository;
use shared::repositories::memory::{InMemoryGameRepository, InMemoryUserRepository};
use shared::repositories::user_repository::UserRepository;
use shared::services::errors::game_service_errors::GameServiceError;
use shared::services::game_service::GameService;
use shared::services::move_service::MoveService;
use shared::services::rating_service::RatingService;
use shared::services::resign_service::ResignService;

struct Harness {
    games: Arc<InMemoryGameRepository>,
    users: Arc<InMemoryUserRepository>,
    creation: GameService,
    moves: MoveService,
    resignations: ResignService,
}

impl Harness {
    fn new(games: Vec<Game>, users: Vec<User>) -> Self {
        let games = Arc::new(InMemoryGameRepository::with_games(games));
        let users = Arc::new(InMemoryUserRepository::with_users(users));
        let ratings = Arc::new(RatingService::new(users.clone()));

        Harness {
            creation: GameService::new(
                games.clone(),
                users.clone(),
                Arc::new(BoardEngineLauncher),
                10,
            ),
            moves: MoveService::new(
                games.clone(),
                ratings.clone(),
                Arc::new(BoardEngineLauncher),
                10,
            ),
            resignations: ResignService::new(games.clone(), ratings),
            games,
            users,
        }
    }

    async fn stored(&self, game_id: &str) -> Result<Game> {
        self.games
            .get_game(game_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("game {} was not stored", game_id))
    }

    async fn rating(&self, username: &str) -> Result<i32> {
        Ok(self.users.get_user(username).await?.rating)
    }
}

fn bot_game_at(fen: &str, side: Side, legal_moves: &[&str]) -> Result<Game> {
    let mut game = Game::versus_bot("alice", side, 5);
    game.position = fen.parse()?;
    game.legal_moves = legal_moves.iter().map(|m| m.to_string()).collect();
    Ok(game)
}

#[tokio::test]
async fn test_game_progresses_through_several_turns() -> Result<()> {
    let game = Game::versus_bot("alice", Side::White, 5);
    let game_id = game.game_id.clone();
    let harness = Harness::new(vec![game], vec![User::new("alice")]);

    let first = harness.moves.submit_move(&game_id, "e2e4").await?;
    assert!(first.engine_move.is_some());
    assert_eq!(first.game.move_history.len(), 2);

    for turn in 2..=4 {
        let current = harness.stored(&game_id).await?;
        let next = current.legal_moves[0].clone();
        let outcome = harness.moves.submit_move(&game_id, &next).await?;

        assert_eq!(outcome.game.move_history.len(), turn * 2);
        assert_eq!(outcome.game.position.fullmove_number, turn as u32 + 1);
    }

    let stored = harness.stored(&game_id).await?;
    assert!(stored.active);
    assert!(stored.winner.is_none());
    assert!(!stored.legal_moves.is_empty());
    assert_eq!(harness.rating("alice").await?, 1200);
    Ok(())
}

#[tokio::test]
async fn test_every_opening_move_is_accepted() -> Result<()> {
    for token in STARTING_LEGAL_MOVES {
        let game = Game::versus_bot("alice", Side::White, 5);
        let game_id = game.game_id.clone();
        let harness = Harness::new(vec![game], vec![User::new("alice")]);

        let outcome = harness.moves.submit_move(&game_id, token).await?;

        assert_eq!(outcome.game.move_history[0], token);
        assert_eq!(outcome.game.move_history.len(), 2);
        assert!(outcome.game.active, "game ended after {}", token);
    }
    Ok(())
}

#[tokio::test]
async fn test_black_seat_starts_after_bot_opening() -> Result<()> {
    let harness = Harness::new(vec![], vec![User::new("alice")]);
    let request = CreateGameRequest {
        auth_user_white: false,
        other_user_id: None,
        bot_difficulty: Some(5),
    };

    let created = harness.creation.create_game("alice", &request).await?;
    assert_eq!(created.position.side_to_move, Side::Black);
    assert_eq!(created.move_history.len(), 1);

    let rejected = harness.moves.submit_move(&created.game_id, "e2e4").await;
    assert!(matches!(rejected, Err(GameServiceError::IllegalMove { .. })));

    let outcome = harness.moves.submit_move(&created.game_id, "e7e5").await?;
    assert_eq!(outcome.game.move_history.len(), 3);
    assert_eq!(outcome.game.position.side_to_move, Side::Black);
    assert_eq!(harness.stored(&created.game_id).await?, outcome.game);
    Ok(())
}

#[tokio::test]
async fn test_rejected_move_leaves_game_untouched() -> Result<()> {
    let game = Game::versus_bot("alice", Side::White, 5);
    let game_id = game.game_id.clone();
    let harness = Harness::new(vec![game.clone()], vec![User::new("alice")]);

    let result = harness.moves.submit_move(&game_id, "e7e5").await;

    assert!(matches!(result, Err(GameServiceError::IllegalMove { .. })));
    assert_eq!(harness.stored(&game_id).await?, game);
    Ok(())
}

#[tokio::test]
async fn test_fools_mate_rewards_black_player() -> Result<()> {
    let game = bot_game_at(
        "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2",
        Side::Black,
        &["d8h4", "d7d5"],
    )?;
    let game_id = game.game_id.clone();
    let harness = Harness::new(vec![game], vec![User::new("alice")]);

    let outcome = harness.moves.submit_move(&game_id, "d8h4").await?;

    assert!(outcome.engine_move.is_none());
    let stored = harness.stored(&game_id).await?;
    assert!(!stored.active);
    assert_eq!(stored.winner, Some(Winner::Black));
    assert_eq!(stored.termination, Some(Termination::Checkmate));
    assert_eq!(harness.rating("alice").await?, 1223);
    Ok(())
}

#[tokio::test]
async fn test_stalemate_is_a_draw() -> Result<()> {
    let game = bot_game_at("7k/8/6K1/8/8/8/8/5Q2 w - - 0 1", Side::White, &["f1f7"])?;
    let game_id = game.game_id.clone();
    let harness = Harness::new(vec![game], vec![User::new("alice")]);

    let outcome = harness.moves.submit_move(&game_id, "f1f7").await?;

    assert_eq!(outcome.game.winner, Some(Winner::Draw));
    assert_eq!(outcome.game.termination, Some(Termination::Stalemate));
    assert_eq!(harness.rating("alice").await?, 1207);
    Ok(())
}

#[tokio::test]
async fn test_fifty_move_rule_ends_game() -> Result<()> {
    let game = bot_game_at("4k3/8/8/8/8/8/8/R3K3 w - - 99 80", Side::White, &["a1a2"])?;
    let game_id = game.game_id.clone();
    let harness = Harness::new(vec![game], vec![User::new("alice")]);

    let outcome = harness.moves.submit_move(&game_id, "a1a2").await?;

    assert!(outcome.engine_move.is_none());
    assert_eq!(outcome.game.termination, Some(Termination::FiftyMoveRule));
    assert_eq!(outcome.game.position.halfmove_clock, 100);
    assert!(outcome.game.legal_moves.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_capture_leaving_two_kings_is_a_draw() -> Result<()> {
    let game = bot_game_at("7k/8/8/8/8/8/4r3/4K3 w - - 0 1", Side::White, &["e1e2"])?;
    let game_id = game.game_id.clone();
    let harness = Harness::new(vec![game], vec![User::with_rating("alice", 1350)]);

    let outcome = harness.moves.submit_move(&game_id, "e1e2").await?;

    assert!(!outcome.game.active);
    assert_eq!(outcome.game.winner, Some(Winner::Draw));
    assert_eq!(
        outcome.game.termination,
        Some(Termination::InsufficientMaterial)
    );
    assert!(outcome.game.legal_moves.is_empty());
    assert_eq!(harness.rating("alice").await?, 1350);
    Ok(())
}

#[tokio::test]
async fn test_resignation_between_players_then_moves_rejected() -> Result<()> {
    let game = Game::versus_player("alice", "bob");
    let game_id = game.game_id.clone();
    let harness = Harness::new(
        vec![game],
        vec![User::new("alice"), User::new("bob")],
    );

    harness.moves.submit_move(&game_id, "d2d4").await?;
    let resigned = harness.resignations.resign(&game_id, "alice").await?;

    assert_eq!(resigned.winner, Some(Winner::Black));
    assert_eq!(harness.rating("alice").await?, 1184);
    assert_eq!(harness.rating("bob").await?, 1216);

    let after = harness.moves.submit_move(&game_id, "e2e4").await;
    assert!(matches!(after, Err(GameServiceError::GameInactive(_))));
    Ok(())
}

#[tokio::test]
async fn test_outsider_cannot_resign() -> Result<()> {
    let game = Game::versus_player("alice", "bob");
    let game_id = game.game_id.clone();
    let harness = Harness::new(
        vec![game],
        vec![User::new("alice"), User::new("bob"), User::new("carol")],
    );

    let result = harness.resignations.resign(&game_id, "carol").await;

    assert!(matches!(result, Err(GameServiceError::NotAParticipant(_))));
    assert!(harness.stored(&game_id).await?.active);
    Ok(())
}
