//! Retrieval engine: embed → over-fetch → scope filter → truncate.
//!
//! Scope filtering happens after the nearest-neighbour search, so the search
//! asks for `top_k * overfetch_factor` candidates. That wider pool is what lets
//! a scoped query still surface its nearest in-scope chunks when other
//! documents dominate the global ranking.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::store::VectorStore;
use super::types::{Chunk, IngestReport, Retrieval, RetrievedChunk};
use crate::core::config::RetrievalSettings;
use crate::core::errors::ApiError;
use crate::llm::EmbeddingGateway;

/// Configuration for the retrieval engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Multiplier applied to `top_k` when querying the index
    pub overfetch_factor: usize,
    /// Result count used when a caller does not ask for one
    pub default_top_k: usize,
    /// Largest accepted `top_k`
    pub max_top_k: usize,
    /// Drop repeated (url, text) pairs, e.g. from re-ingesting the same page
    pub deduplicate: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            overfetch_factor: 3,
            default_top_k: 5,
            max_top_k: 100,
            deduplicate: true,
        }
    }
}

impl From<&RetrievalSettings> for RetrievalConfig {
    fn from(settings: &RetrievalSettings) -> Self {
        Self {
            overfetch_factor: settings.overfetch_factor.max(1),
            default_top_k: settings.default_top_k,
            max_top_k: settings.max_top_k,
            deduplicate: settings.deduplicate,
        }
    }
}

#[derive(Clone)]
pub struct RetrievalEngine {
    store: VectorStore,
    embedder: EmbeddingGateway,
    config: RetrievalConfig,
}

impl RetrievalEngine {
    /// Creates an engine over a fresh, empty store sized to the embedder.
    pub fn new(embedder: EmbeddingGateway, config: RetrievalConfig) -> Self {
        let store = VectorStore::new(embedder.dimension());
        Self {
            store,
            embedder,
            config,
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn embedder(&self) -> &EmbeddingGateway {
        &self.embedder
    }

    /// Falls back to the configured default when the caller gave no `top_k`.
    pub fn resolve_top_k(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.config.default_top_k)
    }

    /// Validates, embeds in one batch, then appends atomically.
    ///
    /// The embedding call runs without holding any store lock.
    pub async fn ingest(&self, chunks: Vec<Chunk>) -> Result<IngestReport, ApiError> {
        for chunk in &chunks {
            chunk.validate()?;
        }

        if chunks.is_empty() {
            return Ok(IngestReport {
                accepted: 0,
                total: self.store.len().await,
            });
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await?;

        let accepted = chunks.len();
        let total = self.store.append(chunks, embeddings).await?;
        tracing::info!("Ingested {} chunks ({} stored)", accepted, total);

        Ok(IngestReport { accepted, total })
    }

    /// Up to `top_k` chunks nearest to `query`, restricted to `url` if given.
    pub async fn query(
        &self,
        query: &str,
        url: Option<&str>,
        top_k: usize,
    ) -> Result<Retrieval, ApiError> {
        self.check_top_k(top_k)?;

        if self.store.is_empty().await {
            return Ok(Retrieval::Empty);
        }

        let embedding = self.embedder.embed_one(query).await?;

        let snapshot = self.store.read().await;
        let fetch = top_k.saturating_mul(self.config.overfetch_factor.max(1));
        let candidates = snapshot.index().search(&embedding, fetch)?;

        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut accepted = Vec::with_capacity(top_k);

        for neighbor in &candidates {
            let chunk = match snapshot.ledger().get(neighbor.position) {
                Ok(chunk) => chunk,
                Err(err) => {
                    let skips = self.store.record_divergence();
                    tracing::warn!(
                        "Skipping search hit without ledger entry: {} ({} skipped so far)",
                        err,
                        skips
                    );
                    continue;
                }
            };

            if let Some(scope) = url {
                if chunk.url != scope {
                    continue;
                }
            }

            if self.config.deduplicate && !seen.insert((chunk.url.as_str(), chunk.text.as_str())) {
                continue;
            }

            accepted.push(RetrievedChunk {
                chunk: chunk.clone(),
                distance: neighbor.distance,
                position: neighbor.position,
            });

            if accepted.len() >= top_k {
                break;
            }
        }

        tracing::debug!(
            "Retrieval: {} candidates, {} accepted (top_k={}, scoped={})",
            candidates.len(),
            accepted.len(),
            top_k,
            url.is_some()
        );

        if accepted.is_empty() {
            Ok(Retrieval::NoMatch)
        } else {
            Ok(Retrieval::Found(accepted))
        }
    }

    /// Whether anything has been ingested for `url`.
    pub async fn is_ready(&self, url: Option<&str>) -> bool {
        let Some(url) = url else {
            return false;
        };
        let snapshot = self.store.read().await;
        !snapshot.is_empty() && snapshot.ledger().contains_url(url)
    }

    /// Number of stored chunks for `url`; zero when no url is given.
    pub async fn chunk_count(&self, url: Option<&str>) -> usize {
        match url {
            Some(url) => self.store.read().await.ledger().url_count(url),
            None => 0,
        }
    }

    fn check_top_k(&self, top_k: usize) -> Result<(), ApiError> {
        if top_k == 0 || top_k > self.config.max_top_k {
            return Err(ApiError::Validation(format!(
                "top_k must be between 1 and {}, got {}",
                self.config.max_top_k, top_k
            )));
        }
        Ok(())
    }
}
