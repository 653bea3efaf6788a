use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use shared::models::user::PublicProfile;

use crate::{error::ApiError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/users/public/{username}", get(get_public_user))
}

#[derive(Debug, Serialize)]
pub struct PublicUserResponse {
    pub user: PublicProfile,
}

async fn get_public_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PublicUserResponse>, ApiError> {
    let user = state.user_service.get_public_profile(&username).await?;
    Ok(Json(PublicUserResponse { user }))
}
