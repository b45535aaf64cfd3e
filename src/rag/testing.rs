//! Deterministic gateway fakes shared by the rag and server tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::engine::{RetrievalConfig, RetrievalEngine};
use crate::core::errors::ApiError;
use crate::llm::{EmbeddingGateway, EmbeddingProvider, GenerationProvider, GenerationRequest};

/// Maps known texts to fixed vectors; anything else gets a byte-derived vector.
#[derive(Clone)]
pub struct FakeEmbedder {
    dimension: usize,
    table: Arc<HashMap<String, Vec<f32>>>,
    fail_on: Option<String>,
    calls: Arc<AtomicUsize>,
    texts_seen: Arc<AtomicUsize>,
}

impl FakeEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            table: Arc::new(HashMap::new()),
            fail_on: None,
            calls: Arc::new(AtomicUsize::new(0)),
            texts_seen: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with<const N: usize>(mut self, text: &str, vector: [f32; N]) -> Self {
        assert_eq!(N, self.dimension);
        Arc::make_mut(&mut self.table).insert(text.to_string(), vector.to_vec());
        self
    }

    pub fn failing_on(mut self, text: &str) -> Self {
        self.fail_on = Some(text.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn texts_seen(&self) -> usize {
        self.texts_seen.load(Ordering::SeqCst)
    }

    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        if let Some(vector) = self.table.get(text) {
            return vector.clone();
        }
        let mut vector = vec![0.0; self.dimension];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % self.dimension] += byte as f32 * (i + 1) as f32;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    fn name(&self) -> &str {
        "fake"
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts_seen.fetch_add(inputs.len(), Ordering::SeqCst);
        if let Some(bad) = &self.fail_on {
            if inputs.iter().any(|text| text == bad) {
                return Err(ApiError::Gateway("fake embedder refused".to_string()));
            }
        }
        Ok(inputs.iter().map(|text| self.vector_for(text)).collect())
    }
}

/// Records prompts and answers with a canned reply (or a canned failure).
#[derive(Clone, Default)]
pub struct FakeGenerator {
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
}

impl FakeGenerator {
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationProvider for FakeGenerator {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ApiError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        if self.fail {
            return Err(ApiError::Gateway("fake generator returned 500".to_string()));
        }
        Ok("- a grounded summary".to_string())
    }
}

pub fn engine_with(
    embedder: FakeEmbedder,
    config: RetrievalConfig,
) -> (RetrievalEngine, FakeEmbedder) {
    let dimension = embedder.dimension;
    let gateway = EmbeddingGateway::new(
        Arc::new(embedder.clone()),
        dimension,
        Duration::from_secs(5),
    );
    (RetrievalEngine::new(gateway, config), embedder)
}
