pub mod game;
pub mod health;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support;
