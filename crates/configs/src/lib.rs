//! # configs
//!
//! Layered settings for the board: compiled defaults, then an optional TOML
//! file, then `BOARD__*` environment variables (a `.env` file is read
//! first). Nested keys use `__`, e.g. `BOARD__BOARD__TOP_LIMIT=10` or
//! `BOARD__LOG__JSON=true`.

pub mod telemetry;

use std::path::Path;

use config::{Config, Environment, File};
use domains::{BoardPolicy, MAX_RANKING_WINDOW_DAYS};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use telemetry::init_tracing;

pub const ENV_PREFIX: &str = "BOARD";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to install tracing subscriber: {0}")]
    Telemetry(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    pub board: BoardPolicy,
    pub log: LogSettings,
}

impl BoardSettings {
    /// Loads settings from `path` (if it exists) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_sources(path, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    fn from_sources(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        builder = builder.add_source(env);

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validate()?;

        debug!(?settings, "configuration loaded");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let board = &self.board;
        let zero = [
            ("board.short_content_length", board.short_content_length == 0),
            ("board.top_limit", board.top_limit == 0),
            ("board.ranking_window_days", board.ranking_window_days <= 0),
            ("board.latest_limit", board.latest_limit == 0),
            ("board.conflict_retry_limit", board.conflict_retry_limit == 0),
            ("board.search_retry_attempts", board.search_retry_attempts == 0),
        ];
        if let Some((key, _)) = zero.iter().find(|(_, bad)| *bad) {
            return Err(ConfigError::Invalid(format!("{key} must be positive")));
        }
        if board.ranking_window_days > MAX_RANKING_WINDOW_DAYS {
            return Err(ConfigError::Invalid(format!(
                "board.ranking_window_days must be at most {MAX_RANKING_WINDOW_DAYS}"
            )));
        }
        if board.sequence_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "board.sequence_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
