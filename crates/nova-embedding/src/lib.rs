mod cache;
mod ollama;

pub use cache::EmbeddingCache;
pub use nova_core::EmbeddingVector;
pub use ollama::OllamaEmbedder;

/// Embedding provider interface
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    /// Convert text into a semantic vector
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbedError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub model: String,
    pub endpoint: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Embedding service returned HTTP {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Response contained no embedding")]
    EmptyEmbedding,

    #[error("Embedding request timed out")]
    Timeout,
}
