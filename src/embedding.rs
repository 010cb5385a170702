//! OpenAI-compatible embeddings client.
//!
//! Maps text to fixed-length vectors via the `/v1/embeddings` endpoint.
//! Shares the API base and key with the chat client.

use crate::config::Config;
use crate::error::{RagChatError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Request body for the embeddings endpoint.
#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

/// Response from the embeddings endpoint.
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// OpenAI API error response.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// OpenAI-compatible embeddings client.
#[derive(Clone)]
pub struct EmbeddingClient {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl EmbeddingClient {
    /// Create a new embeddings client.
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Create from the application configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.llm.api_base.clone(),
            config.llm.api_key.clone(),
            config.embedding.model.clone(),
        )
    }

    /// The embedding model this client requests.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the API endpoint URL.
    fn endpoint(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/v1/embeddings", base)
    }

    /// Embed a single text.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text]).await?;
        vectors
            .pop()
            .ok_or_else(|| RagChatError::LlmApi("No embedding in response".to_string()))
    }

    /// Embed a batch of texts, returning one vector per input in input order.
    pub async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: texts.iter().map(|t| t.to_string()).collect(),
        };

        tracing::debug!(model = %self.model, batch = texts.len(), "sending embeddings request");

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&body) {
                return Err(RagChatError::LlmApi(format!(
                    "API error ({}): {}",
                    status, api_error.error.message
                )));
            }
            return Err(RagChatError::LlmApi(format!(
                "Request failed ({}): {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = serde_json::from_str(&body)?;

        if parsed.data.len() != texts.len() {
            return Err(RagChatError::LlmApi(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        // The API may return entries out of order; restore input order.
        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_construction() {
        let client = EmbeddingClient::new("https://api.example.com/", "key", "text-embedding-3-small");
        assert_eq!(client.endpoint(), "https://api.example.com/v1/embeddings");
    }

    #[tokio::test]
    async fn test_embed_batch_restores_input_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data": [
                    {"embedding": [0.4, 0.5], "index": 1},
                    {"embedding": [0.1, 0.2], "index": 0}
                ]}"#,
            )
            .create_async()
            .await;

        let client = EmbeddingClient::new(server.url(), "key", "text-embedding-3-small");
        let vectors = client.embed_batch(&["first", "second"]).await.unwrap();

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], vec![0.1, 0.2]);
        assert_eq!(vectors[1], vec![0.4, 0.5]);
    }

    #[tokio::test]
    async fn test_embed_batch_empty_input_skips_request() {
        let client = EmbeddingClient::new("https://unused.example.com", "key", "model");
        let vectors = client.embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    #[tokio::test]
    async fn test_embed_surfaces_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/embeddings")
            .with_status(429)
            .with_body(r#"{"error": {"message": "rate limited"}}"#)
            .create_async()
            .await;

        let client = EmbeddingClient::new(server.url(), "key", "model");
        let err = client.embed("text").await.unwrap_err();
        assert!(matches!(err, RagChatError::LlmApi(_)));
        assert!(err.to_string().contains("rate limited"));
    }
}
