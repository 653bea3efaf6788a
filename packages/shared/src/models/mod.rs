pub mod auth;
pub mod game;
pub mod position;
pub mod requests;
pub mod user;
