pub mod gateway;
mod http;
pub mod ollama;
pub mod openai;
pub mod provider;
pub mod types;


use std::sync::Arc;

use crate::core::config::{EmbeddingSettings, GenerationSettings, ProviderKind};

pub use gateway::{Embedding, EmbeddingGateway, GenerationGateway};
pub use ollama::OllamaProvider;
pub use openai::OpenAiCompatProvider;
pub use provider::{EmbeddingProvider, GenerationProvider};
pub use types::{ChatMessage, GenerationRequest};

pub fn embedding_gateway(settings: &EmbeddingSettings) -> EmbeddingGateway {
    let provider: Arc<dyn EmbeddingProvider> = match settings.provider {
        ProviderKind::Ollama => Arc::new(OllamaProvider::new(&settings.base_url, &settings.model)),
        ProviderKind::Openai => Arc::new(OpenAiCompatProvider::new(
            &settings.base_url,
            &settings.model,
            settings.api_key.clone(),
        )),
    };
    EmbeddingGateway::new(provider, settings.dimension, settings.timeout())
        .with_normalize(settings.normalize)
}

pub fn generation_gateway(settings: &GenerationSettings) -> GenerationGateway {
    let provider: Arc<dyn GenerationProvider> = match settings.provider {
        ProviderKind::Ollama => Arc::new(OllamaProvider::new(&settings.base_url, &settings.model)),
        ProviderKind::Openai => Arc::new(OpenAiCompatProvider::new(
            &settings.base_url,
            &settings.model,
            settings.api_key.clone(),
        )),
    };
    GenerationGateway::new(provider, settings.timeout())
        .with_temperature(settings.temperature)
        .with_max_tokens(settings.max_tokens)
}
