use std::fmt;
use std::str::FromStr;

pub const DEFAULT_THINK_TIME_MS: u64 = 500;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 250;
pub const DEFAULT_STOCKFISH_PATH: &str = "stockfish";

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "{} environment variable must be set", name),
            ConfigError::Invalid { name, value } => {
                write!(f, "{} has an invalid value: {}", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// An external Stockfish binary driven over stdin/stdout.
    Stockfish,
    /// The in-process engine from [`crate::engine::board`].
    Board,
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stockfish" => Ok(EngineKind::Stockfish),
            "board" => Ok(EngineKind::Board),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub kind: EngineKind,
    pub stockfish_path: String,
    pub think_time_ms: u64,
    pub read_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            kind: EngineKind::Stockfish,
            stockfish_path: DEFAULT_STOCKFISH_PATH.to_string(),
            think_time_ms: DEFAULT_THINK_TIME_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub games_table: String,
    pub users_table: String,
    pub jwt_secret: String,
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));
        let defaults = EngineConfig::default();

        let kind = match lookup("ENGINE_KIND") {
            Some(value) => value.parse().map_err(|value| ConfigError::Invalid {
                name: "ENGINE_KIND",
                value,
            })?,
            None => defaults.kind,
        };

        Ok(AppConfig {
            games_table: required("GAMES_TABLE")?,
            users_table: required("USERS_TABLE")?,
            jwt_secret: required("JWT_SECRET")?,
            engine: EngineConfig {
                kind,
                stockfish_path: lookup("STOCKFISH_PATH").unwrap_or(defaults.stockfish_path),
                think_time_ms: parse_millis(&lookup, "ENGINE_THINK_TIME_MS", defaults.think_time_ms)?,
                read_timeout_ms: parse_millis(
                    &lookup,
                    "ENGINE_READ_TIMEOUT_MS",
                    defaults.read_timeout_ms,
                )?,
            },
        })
    }
}

fn parse_millis<F>(lookup: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("GAMES_TABLE", "games"),
        ("USERS_TABLE", "users"),
        ("JWT_SECRET", "secret"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.games_table, "games");
        assert_eq!(config.users_table, "users");
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_engine_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("ENGINE_KIND", "Board"),
            ("STOCKFISH_PATH", "/opt/bin/stockfish"),
            ("ENGINE_THINK_TIME_MS", "1200"),
            ("ENGINE_READ_TIMEOUT_MS", "50"),
        ]);

        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.engine.kind, EngineKind::Board);
        assert_eq!(config.engine.stockfish_path, "/opt/bin/stockfish");
        assert_eq!(config.engine.think_time_ms, 1200);
        assert_eq!(config.engine.read_timeout_ms, 50);
    }

    #[test]
    fn test_missing_required_variable() {
        let result = AppConfig::from_lookup(lookup(&REQUIRED[..2]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn test_invalid_values() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("ENGINE_THINK_TIME_MS", "soon"));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid { name: "ENGINE_THINK_TIME_MS", .. })
        ));

        let mut vars = REQUIRED.to_vec();
        vars.push(("ENGINE_KIND", "leela"));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid { name: "ENGINE_KIND", .. })
        ));
    }
}
