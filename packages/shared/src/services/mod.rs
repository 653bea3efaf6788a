pub mod auth_service;
pub mod errors;
pub mod game_outcome_service;
pub mod game_service;
pub mod move_service;
pub mod rating_service;
pub mod resign_service;
pub mod user_service;
