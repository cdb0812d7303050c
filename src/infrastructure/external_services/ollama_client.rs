use async_trait::async_trait;
use pgvector::Vector;
use reqwest::{Client, Error as ReqwestError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::embedding_provider::{EmbeddingProvider, EmbeddingServiceError};
use crate::application::ports::generation_provider::{GenerationProvider, GenerationServiceError};
use crate::config::AppConfig;

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Option<Vec<f32>>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OllamaClientConfig {
    pub base_url: String,
    pub embedding_model: String,
    pub generation_model: String,
    pub embedding_dimension: usize,
    pub timeout_secs: u64,
}

impl OllamaClientConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.ollama_base_url.clone(),
            embedding_model: config.embedding_model.clone(),
            generation_model: config.generation_model.clone(),
            embedding_dimension: config.embedding_dimension,
            timeout_secs: config.request_timeout_secs,
        }
    }
}

/// Client for the Ollama embedding and generation endpoints. A single
/// attempt per call with a bounded timeout; retry policy belongs to callers.
/// Holds no mutable state, so one instance serves all requests concurrently.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    config: OllamaClientConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaClientConfig) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn embeddings_url(&self) -> String {
        format!("{}/api/embeddings", self.config.base_url)
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.config.base_url)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vector, EmbeddingServiceError> {
        let request = EmbeddingsRequest {
            model: &self.config.embedding_model,
            prompt: text,
        };

        let response = self
            .client
            .post(self.embeddings_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingServiceError::NetworkError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(EmbeddingServiceError::StatusError(response.status().as_u16()));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingServiceError::MalformedResponse(e.without_url().to_string()))?;

        let embedding = body.embedding.ok_or_else(|| {
            EmbeddingServiceError::MalformedResponse("missing embedding field".to_string())
        })?;

        Ok(Vector::from(embedding))
    }

    fn dimension(&self) -> usize {
        self.config.embedding_dimension
    }
}

#[async_trait]
impl GenerationProvider for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationServiceError> {
        let request = GenerateRequest {
            model: &self.config.generation_model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(self.generate_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationServiceError::NetworkError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(GenerationServiceError::StatusError(response.status().as_u16()));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationServiceError::MalformedResponse(e.without_url().to_string()))?;

        body.response.ok_or_else(|| {
            GenerationServiceError::MalformedResponse("missing response field".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> OllamaClientConfig {
        OllamaClientConfig {
            base_url: "http://localhost:11434".to_string(),
            embedding_model: "mxbai-embed-large:latest".to_string(),
            generation_model: "granite-code:8b".to_string(),
            embedding_dimension: 1024,
            timeout_secs: 30,
        }
    }

    #[test]
    fn endpoint_urls_are_built_from_the_base_url() {
        let client = OllamaClient::new(test_config()).unwrap();

        assert_eq!(client.embeddings_url(), "http://localhost:11434/api/embeddings");
        assert_eq!(client.generate_url(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn embedding_request_serializes_model_and_prompt() {
        let request = EmbeddingsRequest {
            model: "mxbai-embed-large:latest",
            prompt: "hello",
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "mxbai-embed-large:latest");
        assert_eq!(json["prompt"], "hello");
    }

    #[test]
    fn generate_request_disables_streaming() {
        let request = GenerateRequest {
            model: "granite-code:8b",
            prompt: "hello",
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
    }
}
