use std::sync::Arc;

use shared::engine::EngineLauncher;
use shared::repositories::game_repository::GameRepository;
use shared::repositories::user_repository::UserRepository;
use shared::services::auth_service::AuthService;
use shared::services::game_service::GameService;
use shared::services::move_service::MoveService;
use shared::services::rating_service::RatingService;
use shared::services::resign_service::ResignService;
use shared::services::user_service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub game_service: Arc<GameService>,
    pub move_service: Arc<MoveService>,
    pub resign_service: Arc<ResignService>,
    pub user_service: Arc<UserService>,
}

impl AppState {
    pub fn new(
        game_repository: Arc<dyn GameRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        engine_launcher: Arc<dyn EngineLauncher>,
        think_time_ms: u64,
        jwt_secret: String,
    ) -> Self {
        let rating_service = Arc::new(RatingService::new(user_repository.clone()));
        AppState {
            auth_service: Arc::new(AuthService::new(jwt_secret)),
            game_service: Arc::new(GameService::new(
                game_repository.clone(),
                user_repository.clone(),
                engine_launcher.clone(),
                think_time_ms,
            )),
            move_service: Arc::new(MoveService::new(
                game_repository.clone(),
                rating_service.clone(),
                engine_launcher,
                think_time_ms,
            )),
            resign_service: Arc::new(ResignService::new(game_repository, rating_service)),
            user_service: Arc::new(UserService::new(user_repository)),
        }
    }
}
