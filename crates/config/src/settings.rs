//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{embedding, endpoints, index, retrieval};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Index artifact location
    #[serde(default)]
    pub index: IndexConfig,

    /// Embedding provider
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Query-time retrieval behaviour
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Logging
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Where the artifact pair and the source corpus live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory holding both artifact files
    #[serde(default = "default_index_dir")]
    pub dir: String,

    /// Vector collection file name
    #[serde(default = "default_vectors_file")]
    pub vectors_file: String,

    /// Metadata collection file name
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,

    /// Corpus used by `build` when none is given
    #[serde(default = "default_corpus_path")]
    pub corpus_path: String,
}

fn default_index_dir() -> String {
    index::DEFAULT_DIR.to_string()
}

fn default_vectors_file() -> String {
    index::VECTORS_FILE.to_string()
}

fn default_metadata_file() -> String {
    index::METADATA_FILE.to_string()
}

fn default_corpus_path() -> String {
    index::DEFAULT_CORPUS.to_string()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: default_index_dir(),
            vectors_file: default_vectors_file(),
            metadata_file: default_metadata_file(),
            corpus_path: default_corpus_path(),
        }
    }
}

/// Embedding backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// OpenAI-compatible `/embeddings` endpoint
    #[default]
    OpenAi,
    /// Local Ollama `/api/embed`
    Ollama,
    /// Deterministic offline hash embedder
    Hash,
}

/// Embedding provider configuration
///
/// Unset model, endpoint and dimension fall back to per-provider defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProviderKind,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub endpoint: Option<String>,

    /// API key; defaults to `OPENAI_API_KEY` from the environment
    #[serde(default = "default_api_key")]
    pub api_key: Option<String>,

    /// Output dimension (also sent as `dimensions` to OpenAI when set)
    #[serde(default)]
    pub dimension: Option<usize>,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_api_key() -> Option<String> {
    std::env::var(embedding::OPENAI_API_KEY_ENV)
        .ok()
        .filter(|k| !k.trim().is_empty())
}

fn default_request_timeout_ms() -> u64 {
    embedding::REQUEST_TIMEOUT_MS
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            model: None,
            endpoint: None,
            api_key: default_api_key(),
            dimension: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl EmbeddingConfig {
    /// Model name, falling back to the provider default
    pub fn resolved_model(&self) -> String {
        if let Some(model) = &self.model {
            return model.clone();
        }
        match self.provider {
            EmbeddingProviderKind::OpenAi => embedding::OPENAI_MODEL.to_string(),
            EmbeddingProviderKind::Ollama => embedding::OLLAMA_MODEL.to_string(),
            EmbeddingProviderKind::Hash => "hash".to_string(),
        }
    }

    /// Endpoint, falling back to the provider default
    pub fn resolved_endpoint(&self) -> String {
        if let Some(endpoint) = &self.endpoint {
            return endpoint.clone();
        }
        match self.provider {
            EmbeddingProviderKind::OpenAi => endpoints::OPENAI_DEFAULT.to_string(),
            EmbeddingProviderKind::Ollama => endpoints::OLLAMA_DEFAULT.to_string(),
            EmbeddingProviderKind::Hash => String::new(),
        }
    }

    /// Vector dimension, falling back to the provider default
    pub fn resolved_dimension(&self) -> usize {
        self.dimension.unwrap_or(match self.provider {
            EmbeddingProviderKind::OpenAi => embedding::OPENAI_DIMENSION,
            EmbeddingProviderKind::Ollama => embedding::OLLAMA_DIMENSION,
            EmbeddingProviderKind::Hash => embedding::HASH_DIMENSION,
        })
    }
}

/// How language filtering interacts with nearest-neighbour search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Exact k-NN inside the requested language's partition
    #[default]
    Partitioned,
    /// Global k-NN over a widened candidate window, then drop other languages
    OverFetch,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Matches per query when the caller does not say
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub strategy: SearchStrategy,

    /// Candidate window is `overfetch_factor * top_k` for `over_fetch`
    #[serde(default = "default_overfetch_factor")]
    pub overfetch_factor: usize,
}

fn default_top_k() -> usize {
    retrieval::DEFAULT_TOP_K
}

fn default_overfetch_factor() -> usize {
    retrieval::OVERFETCH_FACTOR
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            strategy: SearchStrategy::default(),
            overfetch_factor: default_overfetch_factor(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl Settings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_index()?;
        self.validate_embedding()?;
        self.validate_retrieval()?;
        Ok(())
    }

    fn validate_index(&self) -> Result<(), ConfigError> {
        let index = &self.index;

        for (field, value) in [
            ("index.dir", &index.dir),
            ("index.vectors_file", &index.vectors_file),
            ("index.metadata_file", &index.metadata_file),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "Must not be empty".to_string(),
                });
            }
        }

        if index.vectors_file == index.metadata_file {
            return Err(ConfigError::InvalidValue {
                field: "index.metadata_file".to_string(),
                message: format!(
                    "Must differ from index.vectors_file ({})",
                    index.vectors_file
                ),
            });
        }

        Ok(())
    }

    fn validate_embedding(&self) -> Result<(), ConfigError> {
        let embedding = &self.embedding;

        if embedding.dimension == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "embedding.dimension".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if embedding.resolved_model().trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "embedding.model".to_string(),
                message: "Must not be empty".to_string(),
            });
        }

        if embedding.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "embedding.request_timeout_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if embedding.provider == EmbeddingProviderKind::OpenAi
            && self.environment.is_strict()
            && embedding.api_key.is_none()
        {
            return Err(ConfigError::MissingField("embedding.api_key".to_string()));
        }

        Ok(())
    }

    fn validate_retrieval(&self) -> Result<(), ConfigError> {
        let retrieval = &self.retrieval;

        if retrieval.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.top_k".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if retrieval.overfetch_factor == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.overfetch_factor".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Load settings from files and environment
///
/// Priority: env vars > config/{env} > config/default > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("VOICE_FAQ")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    tracing::debug!(
        environment = ?settings.environment,
        provider = ?settings.embedding.provider,
        index_dir = %settings.index.dir,
        "Settings loaded"
    );

    Ok(settings)
}
