use std::time::Duration;

use async_trait::async_trait;
use nova_core::EmbeddingVector;
use serde::Serialize;

use crate::{EmbedError, Embedder, ProviderMetadata};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for an Ollama-style `/api/embeddings` endpoint
#[derive(Clone)]
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str) -> Result<Self, EmbedError> {
        Self::with_timeout(base_url, model, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, model: &str, timeout: Duration) -> Result<Self, EmbedError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        tracing::info!("Embedding client created (URL: {}, model: {})", base_url, model);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/embeddings", self.base_url)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbedError> {
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(EmbedError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        let vector = parse_embedding(&body)?;

        tracing::debug!(
            "Generated embedding with {} dimensions for '{}'",
            vector.dimensions(),
            text
        );

        Ok(vector)
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "ollama".to_string(),
            model: self.model.clone(),
            endpoint: self.endpoint(),
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> EmbedError {
    if e.is_timeout() {
        EmbedError::Timeout
    } else {
        EmbedError::NetworkError(e)
    }
}

/// Extract the `embedding` array; non-numeric elements become 0.0
fn parse_embedding(body: &[u8]) -> Result<EmbeddingVector, EmbedError> {
    let json: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| EmbedError::Malformed(format!("Failed to parse response: {}", e)))?;

    let values = json
        .get("embedding")
        .and_then(|v| v.as_array())
        .filter(|values| !values.is_empty())
        .ok_or(EmbedError::EmptyEmbedding)?;

    Ok(values
        .iter()
        .map(|v| v.as_f64().unwrap_or(0.0) as f32)
        .collect::<Vec<_>>()
        .into())
}
