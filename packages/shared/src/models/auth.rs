use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct TokenClaims {
    pub sub: String, // subject (username)
    pub exp: usize,  // expiration time
    pub iat: usize,  // issued at
}
