//! Centralized defaults
//!
//! Single source of truth for default values shared by settings, the
//! embedding clients and the CLI.

/// Service endpoints (defaults for local development)
pub mod endpoints {
    /// OpenAI-compatible API base URL
    pub const OPENAI_DEFAULT: &str = "https://api.openai.com/v1";

    /// Ollama endpoint
    pub const OLLAMA_DEFAULT: &str = "http://localhost:11434";
}

/// Embedding model defaults
pub mod embedding {
    /// OpenAI model used for both build and query time
    pub const OPENAI_MODEL: &str = "text-embedding-3-small";

    /// Output dimension of `text-embedding-3-small`
    pub const OPENAI_DIMENSION: usize = 1536;

    /// Ollama model
    pub const OLLAMA_MODEL: &str = "qwen3-embedding:0.6b";

    /// Output dimension of `qwen3-embedding:0.6b`
    pub const OLLAMA_DIMENSION: usize = 1024;

    /// Dimension of the offline hash embedder
    pub const HASH_DIMENSION: usize = 384;

    /// HTTP request timeout
    pub const REQUEST_TIMEOUT_MS: u64 = 30_000;

    /// Environment variable holding the OpenAI key
    pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
}

/// Index artifact layout
pub mod index {
    /// Directory holding the artifact pair
    pub const DEFAULT_DIR: &str = "data/faiss_index";

    /// Vector collection file
    pub const VECTORS_FILE: &str = "faqs.index";

    /// Metadata collection file
    pub const METADATA_FILE: &str = "metadata.json";

    /// Default corpus file for builds
    pub const DEFAULT_CORPUS: &str = "data/faq_data.json";
}

/// Retrieval defaults
pub mod retrieval {
    /// Matches returned per query
    pub const DEFAULT_TOP_K: usize = 3;

    /// Candidate window multiplier for over-fetch-and-filter search
    pub const OVERFETCH_FACTOR: usize = 2;
}
