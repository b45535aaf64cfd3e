use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults::{
    DEFAULT_EMBEDDING_DIMENSION, DEFAULT_GENERATION_TIMEOUT_SECS, DEFAULT_OVERFETCH_FACTOR,
    DEFAULT_PORT, DEFAULT_TOP_K,
};

/// Typed view of the merged configuration tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
    pub retrieval: RetrievalSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Ollama,
    /// Any server speaking the OpenAI `/v1` API (LM Studio, vLLM, OpenAI itself).
    Openai,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: ProviderKind,
    pub base_url: String,
    pub model: String,
    pub dimension: usize,
    pub normalize: bool,
    pub timeout_secs: u64,
    pub api_key: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            base_url: "http://localhost:11434".to_string(),
            model: "all-minilm".to_string(),
            dimension: DEFAULT_EMBEDDING_DIMENSION,
            normalize: false,
            timeout_secs: 30,
            api_key: None,
        }
    }
}

impl EmbeddingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub provider: ProviderKind,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: Option<f64>,
    /// Upper bound on tokens per completion
    pub max_tokens: Option<u32>,
    pub api_key: Option<String>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            base_url: "http://localhost:11434".to_string(),
            model: "mistral".to_string(),
            timeout_secs: DEFAULT_GENERATION_TIMEOUT_SECS,
            temperature: None,
            max_tokens: None,
            api_key: None,
        }
    }
}

impl GenerationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub overfetch_factor: usize,
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub max_context_chars: usize,
    pub deduplicate: bool,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            overfetch_factor: DEFAULT_OVERFETCH_FACTOR,
            default_top_k: DEFAULT_TOP_K,
            max_top_k: 100,
            max_context_chars: 12_000,
            deduplicate: true,
        }
    }
}
