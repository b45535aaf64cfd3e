use serde_json::{json, Value};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;
pub const DEFAULT_OVERFETCH_FACTOR: usize = 3;
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;

/// Built-in configuration tree that user files are merged over.
pub fn default_config() -> Value {
    json!({
        "server": {
            "host": "127.0.0.1",
            "port": DEFAULT_PORT,
            "cors_allowed_origins": ["*"]
        },
        "embedding": {
            "provider": "ollama",
            "base_url": "http://localhost:11434",
            "model": "all-minilm",
            "dimension": DEFAULT_EMBEDDING_DIMENSION,
            "normalize": false,
            "timeout_secs": 30
        },
        "generation": {
            "provider": "ollama",
            "base_url": "http://localhost:11434",
            "model": "mistral",
            "timeout_secs": DEFAULT_GENERATION_TIMEOUT_SECS
        },
        "retrieval": {
            "overfetch_factor": DEFAULT_OVERFETCH_FACTOR,
            "default_top_k": DEFAULT_TOP_K,
            "max_top_k": 100,
            "max_context_chars": 12_000,
            "deduplicate": true
        }
    })
}
