use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RATING: i32 = 1200;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub username: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: &str) -> Self {
        User {
            username: username.to_string(),
            rating: DEFAULT_RATING,
            created_at: Utc::now(),
        }
    }

    pub fn with_rating(username: &str, rating: i32) -> Self {
        User {
            rating,
            ..User::new(username)
        }
    }
}

/// The part of a user anyone may look up.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PublicProfile {
    pub username: String,
    pub rating: i32,
}

impl From<User> for PublicProfile {
    fn from(user: User) -> Self {
        PublicProfile {
            username: user.username,
            rating: user.rating,
        }
    }
}
