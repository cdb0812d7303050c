use async_trait::async_trait;

#[derive(Debug)]
pub enum GenerationServiceError {
    NetworkError(String),
    StatusError(u16),
    /// The response body could not be parsed or lacks the response field.
    MalformedResponse(String),
}

impl std::fmt::Display for GenerationServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationServiceError::NetworkError(msg) => {
                write!(f, "generation service network error: {}", msg)
            }
            GenerationServiceError::StatusError(code) => {
                write!(f, "generation service returned status {}", code)
            }
            GenerationServiceError::MalformedResponse(msg) => {
                write!(f, "malformed generation response: {}", msg)
            }
        }
    }
}

impl std::error::Error for GenerationServiceError {}

/// Prompt-to-text mapping over an external generative model. The model
/// identity and generation parameters are configuration, not contract.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationServiceError>;
}
