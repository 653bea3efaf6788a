use serde::{Deserialize, Serialize};

/// Body of a game creation request. Exactly one of `other_user_id` and
/// `bot_difficulty` names the opponent.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub auth_user_white: bool,
    pub other_user_id: Option<String>,
    pub bot_difficulty: Option<u8>,
}
