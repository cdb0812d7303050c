use async_trait::async_trait;
use pgvector::Vector;

#[derive(Debug)]
pub enum EmbeddingServiceError {
    NetworkError(String),
    /// The service answered with a non-success status.
    StatusError(u16),
    /// The response body could not be parsed or lacks the embedding field.
    MalformedResponse(String),
}

impl std::fmt::Display for EmbeddingServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingServiceError::NetworkError(msg) => {
                write!(f, "embedding service network error: {}", msg)
            }
            EmbeddingServiceError::StatusError(code) => {
                write!(f, "embedding service returned status {}", code)
            }
            EmbeddingServiceError::MalformedResponse(msg) => {
                write!(f, "malformed embedding response: {}", msg)
            }
        }
    }
}

impl std::error::Error for EmbeddingServiceError {}

/// Pure text-to-vector mapping over an external model. No retries at this
/// layer and no shared mutable state; safe to call concurrently.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vector, EmbeddingServiceError>;

    /// Fixed output dimension of the configured model.
    fn dimension(&self) -> usize;
}
