//! Local Ollama embedding client
//!
//! Posts one text per request to `/api/embed`. FAQ texts and user queries go
//! through the same call, so both land in the same vector space.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use voice_faq_config::constants::{embedding, endpoints};

use crate::embeddings::EmbeddingProvider;
use crate::RagError;

/// Connection settings for a local Ollama server
#[derive(Debug, Clone)]
pub struct OllamaEmbeddingConfig {
    /// Server base URL, e.g. `http://localhost:11434`
    pub endpoint: String,
    pub model: String,
    /// Vector length the model produces
    pub dimension: usize,
    pub timeout: Duration,
}

impl Default for OllamaEmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: endpoints::OLLAMA_DEFAULT.to_string(),
            model: embedding::OLLAMA_MODEL.to_string(),
            dimension: embedding::OLLAMA_DIMENSION,
            timeout: Duration::from_millis(embedding::REQUEST_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl EmbedResponse {
    /// Vector for the single input text
    fn into_embedding(self) -> Result<Vec<f32>, RagError> {
        self.embeddings
            .into_iter()
            .next()
            .ok_or_else(|| RagError::EmbeddingProvider("No embedding returned".to_string()))
    }
}

/// Embedding provider backed by Ollama
pub struct OllamaEmbedder {
    client: Client,
    url: String,
    config: OllamaEmbeddingConfig,
}

impl OllamaEmbedder {
    pub fn new(config: OllamaEmbeddingConfig) -> Result<Self, RagError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::EmbeddingProvider(format!("HTTP client: {}", e)))?;
        let url = format!("{}/api/embed", config.endpoint.trim_end_matches('/'));
        Ok(Self { client, url, config })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let request = EmbedRequest {
            model: &self.config.model,
            input: text,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::EmbeddingProvider(format!("Ollama request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::EmbeddingProvider(format!(
                "Ollama /api/embed returned {}: {}",
                status, body
            )));
        }

        let parsed: EmbedResponse = response.json().await.map_err(|e| {
            RagError::EmbeddingProvider(format!("Failed to parse Ollama response: {}", e))
        })?;

        parsed.into_embedding()
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn provider_id(&self) -> String {
        format!("ollama:{}", self.config.model)
    }
}
