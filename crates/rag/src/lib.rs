//! Bilingual semantic FAQ retrieval
//!
//! Features:
//! - Corpus loading from JSON/YAML knowledge files
//! - Dual-language (English/Hindi) embedding index, two records per entry
//! - Positionally aligned vector + metadata artifact with checksum binding
//! - Exact squared-L2 nearest-neighbour search
//! - Language-partitioned or over-fetch-and-filter query strategies
//! - Prompt-ready context rendering and graceful-degradation enrichment
//! - OpenAI, Ollama and offline hash embedding providers

pub mod artifact;
pub mod builder;
pub mod context;
pub mod corpus;
pub mod embeddings;
pub mod engine;
pub mod flat_index;
pub mod ollama_embeddings;
pub mod openai_embeddings;

pub use artifact::{IndexArtifact, IndexManifest, IndexPaths};
pub use builder::{BuildReport, IndexBuilder};
pub use context::{FaqContextEnricher, KnowledgeContext};
pub use corpus::{load_corpus, FaqCorpusFile};
pub use embeddings::{check_embedding, create_embedder, EmbeddingProvider, HashEmbedder};
pub use engine::{format_context, similarity_from_distance, FaqRetrievalEngine};
pub use flat_index::{FlatL2Index, NearestNeighborIndex, Neighbor};
pub use ollama_embeddings::{OllamaEmbedder, OllamaEmbeddingConfig};
pub use openai_embeddings::{OpenAiEmbedder, OpenAiEmbeddingConfig};

use std::path::PathBuf;
use thiserror::Error;

/// RAG errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Malformed FAQ entry #{index} (id {id:?}): field `{field}` is missing or empty")]
    MalformedEntry {
        index: usize,
        id: String,
        field: &'static str,
    },

    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),

    #[error("Failed to write {path}: {message}")]
    OutputWrite { path: PathBuf, message: String },

    #[error("Index not found: {0}")]
    IndexNotFound(PathBuf),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Provider mismatch: index built with {index}, embedder is {embedder}")]
    ProviderMismatch { index: String, embedder: String },

    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RagError> for voice_faq_core::Error {
    fn from(err: RagError) -> Self {
        voice_faq_core::Error::Rag(err.to_string())
    }
}
