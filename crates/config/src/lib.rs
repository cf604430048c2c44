//! Configuration management for the FAQ retrieval engine
//!
//! Supports loading configuration from:
//! - YAML/TOML/JSON files (`config/default`, then `config/{env}`)
//! - Environment variables (`VOICE_FAQ__` prefix, `__` separated)

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, EmbeddingConfig, EmbeddingProviderKind, IndexConfig, ObservabilityConfig,
    RetrievalConfig, RuntimeEnvironment, SearchStrategy, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
