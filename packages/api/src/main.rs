use std::env::set_var;
use std::sync::Arc;

use api::{create_app, state::AppState};
use lambda_http::{run, Error};
use shared::config::AppConfig;
use shared::engine::launcher_from_config;
use shared::repositories::game_repository::DynamoDbGameRepository;
use shared::repositories::user_repository::DynamoDbUserRepository;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    set_var("AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH", "true");

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = AppConfig::from_env()?;
    info!("Starting with {:?} engine", config.engine.kind);

    let aws_config = aws_config::load_from_env().await;
    let client = aws_sdk_dynamodb::Client::new(&aws_config);

    let state = AppState::new(
        Arc::new(DynamoDbGameRepository::new(client.clone(), &config.games_table)),
        Arc::new(DynamoDbUserRepository::new(client, &config.users_table)),
        launcher_from_config(&config.engine),
        config.engine.think_time_ms,
        config.jwt_secret,
    );

    run(create_app(state)).await
}
