use async_trait::async_trait;

use super::types::GenerationRequest;
use crate::core::errors::ApiError;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// return the provider name (e.g. "ollama", "openai")
    fn name(&self) -> &str;

    /// embed a batch of texts, one vector per input, in input order
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;
}

#[async_trait]
pub trait GenerationProvider: Send + Sync {
    fn name(&self) -> &str;

    /// single-shot, non-streaming completion of `request.prompt`
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ApiError>;
}
