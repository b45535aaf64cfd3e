//! Timeout-bounded wrappers around the gateway providers.
//!
//! Providers only speak HTTP. The gateways add what the retrieval core relies
//! on: one vector per input, a fixed dimension, optional normalization, and a
//! hard deadline on every call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::provider::{EmbeddingProvider, GenerationProvider};
use super::types::GenerationRequest;
use crate::core::errors::ApiError;

/// Fixed-length vector produced for one text.
pub type Embedding = Vec<f32>;

async fn bounded<T, F>(label: &str, timeout: Duration, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::GatewayTimeout(format!(
            "{} did not respond within {:?}",
            label, timeout
        ))),
    }
}

#[derive(Clone)]
pub struct EmbeddingGateway {
    provider: Arc<dyn EmbeddingProvider>,
    dimension: usize,
    normalize: bool,
    timeout: Duration,
}

impl EmbeddingGateway {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, dimension: usize, timeout: Duration) -> Self {
        Self {
            provider,
            dimension,
            normalize: false,
            timeout,
        }
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Embeds `texts` with a single provider call.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, ApiError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let label = format!("{} embedding", self.provider.name());
        let mut vectors = bounded(&label, self.timeout, self.provider.embed(texts)).await?;

        if vectors.len() != texts.len() {
            return Err(ApiError::Gateway(format!(
                "{} returned {} vectors for {} inputs",
                label,
                vectors.len(),
                texts.len()
            )));
        }

        for vector in vectors.iter_mut() {
            if vector.len() != self.dimension {
                return Err(ApiError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
            if self.normalize {
                l2_normalize(vector);
            }
        }

        Ok(vectors)
    }

    pub async fn embed_one(&self, text: &str) -> Result<Embedding, ApiError> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| ApiError::Gateway("embedding gateway returned nothing".to_string()))
    }
}

#[derive(Clone)]
pub struct GenerationGateway {
    provider: Arc<dyn GenerationProvider>,
    timeout: Duration,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
}

impl GenerationGateway {
    pub fn new(provider: Arc<dyn GenerationProvider>, timeout: Duration) -> Self {
        Self {
            provider,
            timeout,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Caps the length of each completion; `None` leaves it to the provider.
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        let request = GenerationRequest::new(prompt)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);
        let label = format!("{} generation", self.provider.name());
        bounded(&label, self.timeout, self.provider.generate(&request)).await
    }
}

fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm <= f32::EPSILON {
        return;
    }
    for value in vector.iter_mut() {
        *value /= norm;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubEmbedder {
        calls: AtomicUsize,
        width: usize,
        drop_last: bool,
    }

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        fn name(&self) -> &str {
            "stub"
        }

        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut out: Vec<Vec<f32>> = inputs
                .iter()
                .map(|text| {
                    let mut v = vec![0.0; self.width];
                    v[0] = text.len() as f32;
                    v
                })
                .collect();
            if self.drop_last {
                out.pop();
            }
            Ok(out)
        }
    }

    struct SlowGenerator;

    #[async_trait]
    impl GenerationProvider for SlowGenerator {
        fn name(&self) -> &str {
            "slow"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, ApiError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".to_string())
        }
    }

    #[derive(Default)]
    struct RecordingGenerator {
        requests: std::sync::Mutex<Vec<GenerationRequest>>,
    }

    #[async_trait]
    impl GenerationProvider for RecordingGenerator {
        fn name(&self) -> &str {
            "recording"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String, ApiError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok("ok".to_string())
        }
    }

    fn stub(width: usize, drop_last: bool) -> Arc<StubEmbedder> {
        Arc::new(StubEmbedder {
            calls: AtomicUsize::new(0),
            width,
            drop_last,
        })
    }

    #[tokio::test]
    async fn empty_input_skips_provider() {
        let provider = stub(4, false);
        let gateway = EmbeddingGateway::new(provider.clone(), 4, Duration::from_secs(1));

        let out = gateway.embed(&[]).await.unwrap();

        assert!(out.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn wrong_width_is_a_dimension_mismatch() {
        let gateway = EmbeddingGateway::new(stub(3, false), 4, Duration::from_secs(1));

        let err = gateway.embed(&["abc".to_string()]).await.unwrap_err();

        assert!(matches!(
            err,
            ApiError::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[tokio::test]
    async fn short_response_is_a_gateway_error() {
        let gateway = EmbeddingGateway::new(stub(2, true), 2, Duration::from_secs(1));

        let err = gateway
            .embed(&["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Gateway(_)));
    }

    #[tokio::test]
    async fn normalization_yields_unit_vectors() {
        let gateway =
            EmbeddingGateway::new(stub(2, false), 2, Duration::from_secs(1)).with_normalize(true);

        let v = gateway.embed_one("hello").await.unwrap();

        assert!((v[0] - 1.0).abs() < 1e-6);
        assert_eq!(v[1], 0.0);
    }

    #[tokio::test]
    async fn slow_generation_times_out() {
        let gateway = GenerationGateway::new(Arc::new(SlowGenerator), Duration::from_millis(100));

        let err = gateway.generate("prompt").await.unwrap_err();

        assert!(matches!(err, ApiError::GatewayTimeout(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn sampling_options_reach_the_provider() {
        let provider = Arc::new(RecordingGenerator::default());
        let gateway = GenerationGateway::new(provider.clone(), Duration::from_secs(1))
            .with_temperature(Some(0.2))
            .with_max_tokens(Some(256));

        gateway.generate("prompt").await.unwrap();

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt, "prompt");
        assert_eq!(requests[0].temperature, Some(0.2));
        assert_eq!(requests[0].max_tokens, Some(256));
    }

    #[tokio::test]
    async fn unset_max_tokens_is_left_to_the_provider() {
        let provider = Arc::new(RecordingGenerator::default());
        let gateway = GenerationGateway::new(provider.clone(), Duration::from_secs(1));

        gateway.generate("prompt").await.unwrap();

        assert_eq!(provider.requests.lock().unwrap()[0].max_tokens, None);
    }
}
