//! OpenAI Embeddings
//!
//! Client for OpenAI-compatible `/embeddings` endpoints. Failures are returned
//! as-is; retry policy is left to whoever wraps the call.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::embeddings::EmbeddingProvider;
use crate::RagError;

/// OpenAI embedding configuration
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingConfig {
    /// API base URL, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Expected vector length
    pub dimension: usize,
    /// Send `dimensions` in the request (for models that support shortening)
    pub request_dimensions: bool,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// OpenAI embedder
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    config: OpenAiEmbeddingConfig,
}

impl OpenAiEmbedder {
    pub fn new(config: OpenAiEmbeddingConfig) -> Result<Self, RagError> {
        if config.api_key.trim().is_empty() {
            return Err(RagError::EmbeddingProvider(
                "missing OpenAI API key".to_string(),
            ));
        }
        if config.model.trim().is_empty() {
            return Err(RagError::EmbeddingProvider(
                "missing OpenAI model name".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", config.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|e| RagError::EmbeddingProvider(format!("invalid API key: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| RagError::EmbeddingProvider(format!("HTTP client: {}", e)))?;

        let endpoint = format!("{}/embeddings", config.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: text,
            dimensions: self
                .config
                .request_dimensions
                .then_some(self.config.dimension),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::EmbeddingProvider(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(RagError::EmbeddingProvider(format!(
                "OpenAI embeddings request failed ({}): {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            RagError::EmbeddingProvider(format!("Failed to parse OpenAI response: {}", e))
        })?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| RagError::EmbeddingProvider("No embedding returned".to_string()))
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn provider_id(&self) -> String {
        format!("openai:{}", self.config.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OpenAiEmbeddingConfig {
        OpenAiEmbeddingConfig {
            base_url: "https://api.openai.com/v1/".to_string(),
            api_key: "sk-test".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
            request_dimensions: false,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_endpoint_and_id() {
        let embedder = OpenAiEmbedder::new(config()).unwrap();
        assert_eq!(embedder.endpoint, "https://api.openai.com/v1/embeddings");
        assert_eq!(embedder.provider_id(), "openai:text-embedding-3-small");
        assert_eq!(embedder.dimension(), 1536);
    }

    #[test]
    fn test_blank_key_rejected() {
        let mut cfg = config();
        cfg.api_key = "  ".to_string();
        assert!(OpenAiEmbedder::new(cfg).is_err());
    }

    #[test]
    fn test_request_omits_dimensions_by_default() {
        let request = EmbeddingRequest {
            model: "m",
            input: "hello",
            dimensions: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"model":"m","input":"hello"}"#);
    }
}
