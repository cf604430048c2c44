//! Text Embeddings
//!
//! The retrieval engine treats embedding generation as a black box: any
//! provider that maps text to a fixed-length vector can back an index, as long
//! as the same provider is used at build time and at query time.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use voice_faq_config::{EmbeddingConfig, EmbeddingProviderKind};

use crate::ollama_embeddings::{OllamaEmbedder, OllamaEmbeddingConfig};
use crate::openai_embeddings::{OpenAiEmbedder, OpenAiEmbeddingConfig};
use crate::RagError;

/// Text-to-vector provider
///
/// Implementations must be safe to call concurrently; the engine issues one
/// call per query and never retries a failed call.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError>;

    /// Length of every vector this provider returns
    fn dimension(&self) -> usize;

    /// Identifier recorded in the index, e.g. `openai:text-embedding-3-small`
    fn provider_id(&self) -> String;
}

/// Reject a provider vector of the wrong length or with NaN/infinite values
pub fn check_embedding(embedding: &[f32], dimension: usize) -> Result<(), RagError> {
    if embedding.len() != dimension {
        return Err(RagError::DimensionMismatch {
            expected: dimension,
            actual: embedding.len(),
        });
    }
    if let Some(pos) = embedding.iter().position(|v| !v.is_finite()) {
        return Err(RagError::EmbeddingProvider(format!(
            "non-finite value {} at component {}",
            embedding[pos], pos
        )));
    }
    Ok(())
}

/// Build the configured provider
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>, RagError> {
    let timeout = Duration::from_millis(config.request_timeout_ms);
    let embedder: Arc<dyn EmbeddingProvider> = match config.provider {
        EmbeddingProviderKind::OpenAi => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                RagError::EmbeddingProvider("OpenAI API key is not configured".to_string())
            })?;
            Arc::new(OpenAiEmbedder::new(OpenAiEmbeddingConfig {
                base_url: config.resolved_endpoint(),
                api_key,
                model: config.resolved_model(),
                dimension: config.resolved_dimension(),
                request_dimensions: config.dimension.is_some(),
                timeout,
            })?)
        },
        EmbeddingProviderKind::Ollama => Arc::new(OllamaEmbedder::new(OllamaEmbeddingConfig {
            endpoint: config.resolved_endpoint(),
            model: config.resolved_model(),
            dimension: config.resolved_dimension(),
            timeout,
        })?),
        EmbeddingProviderKind::Hash => Arc::new(HashEmbedder::new(config.resolved_dimension())),
    };

    tracing::info!(
        provider = %embedder.provider_id(),
        dimension = embedder.dimension(),
        "Embedding provider ready"
    );

    Ok(embedder)
}

/// Deterministic embedder needing no model or network
///
/// Hashes characters by code point and position into buckets, then
/// L2-normalises. Useful for offline builds and tests; relevance is lexical at
/// best.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Generate a simple hash-based embedding
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];

        for (i, c) in text.chars().enumerate() {
            let idx = (c as usize + i) % self.dimension;
            embedding[idx] += 1.0;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        Ok(self.embed_sync(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn provider_id(&self) -> String {
        format!("hash:{}", self.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_embedder() {
        let embedder = HashEmbedder::new(384);
        let embedding = embedder.embed_sync("Hello world");

        assert_eq!(embedding.len(), 384);

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_hash_embedder_is_deterministic() {
        let embedder = HashEmbedder::new(64);
        let text = "बैटरी स्वैप कैसे करें?";
        assert_eq!(embedder.embed_sync(text), embedder.embed_sync(text));
        assert_ne!(embedder.embed_sync(text), embedder.embed_sync("battery swap"));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(8);
        assert!(embedder.embed_sync("").iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_check_embedding() {
        assert!(check_embedding(&[0.5, -1.0], 2).is_ok());
        assert!(matches!(
            check_embedding(&[0.5], 2),
            Err(RagError::DimensionMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            check_embedding(&[0.5, f32::NAN], 2),
            Err(RagError::EmbeddingProvider(_))
        ));
        assert!(matches!(
            check_embedding(&[f32::INFINITY, 0.0], 2),
            Err(RagError::EmbeddingProvider(_))
        ));
    }

    #[test]
    fn test_create_hash_embedder_from_config() {
        let config = EmbeddingConfig {
            provider: EmbeddingProviderKind::Hash,
            dimension: Some(32),
            ..EmbeddingConfig::default()
        };
        let embedder = create_embedder(&config).unwrap();
        assert_eq!(embedder.dimension(), 32);
        assert_eq!(embedder.provider_id(), "hash:32");
    }

    #[test]
    fn test_openai_requires_key() {
        let config = EmbeddingConfig {
            provider: EmbeddingProviderKind::OpenAi,
            api_key: None,
            ..EmbeddingConfig::default()
        };
        assert!(matches!(
            create_embedder(&config),
            Err(RagError::EmbeddingProvider(_))
        ));
    }
}
