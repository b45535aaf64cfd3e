//! VectorStore: the vector index and metadata ledger behind a single lock.
//!
//! Both structures are only ever mutated together under the write lock, so a
//! reader never observes an index row without its ledger entry or vice versa.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{RwLock, RwLockReadGuard};

use super::index::VectorIndex;
use super::ledger::MetadataLedger;
use super::types::Chunk;
use crate::core::errors::ApiError;
use crate::llm::Embedding;

#[derive(Debug)]
struct StoreInner {
    index: VectorIndex,
    ledger: MetadataLedger,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub total_chunks: usize,
    pub dimension: usize,
    pub distinct_urls: usize,
    /// Search hits skipped because the ledger had no entry for them.
    pub divergence_skips: u64,
}

#[derive(Clone)]
pub struct VectorStore {
    inner: Arc<RwLock<StoreInner>>,
    divergence_skips: Arc<AtomicU64>,
}

/// Read access to a consistent view of index and ledger.
pub struct StoreSnapshot<'a> {
    guard: RwLockReadGuard<'a, StoreInner>,
}

impl StoreSnapshot<'_> {
    pub fn index(&self) -> &VectorIndex {
        &self.guard.index
    }

    pub fn ledger(&self) -> &MetadataLedger {
        &self.guard.ledger
    }

    pub fn len(&self) -> usize {
        self.guard.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard.index.is_empty()
    }
}

impl VectorStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                index: VectorIndex::new(dimension),
                ledger: MetadataLedger::new(),
            })),
            divergence_skips: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn read(&self) -> StoreSnapshot<'_> {
        StoreSnapshot {
            guard: self.inner.read().await,
        }
    }

    /// Appends chunks and their embeddings as one unit; returns the new total.
    ///
    /// A rejected batch leaves the store untouched: the index validates every
    /// row before pushing any, and the ledger is only extended afterwards.
    pub async fn append(
        &self,
        chunks: Vec<Chunk>,
        embeddings: Vec<Embedding>,
    ) -> Result<usize, ApiError> {
        if chunks.len() != embeddings.len() {
            return Err(ApiError::Internal(format!(
                "cannot append {} chunks with {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let mut inner = self.inner.write().await;
        inner.index.add(&embeddings)?;
        inner.ledger.append(chunks);
        debug_assert_eq!(inner.index.len(), inner.ledger.len());
        Ok(inner.ledger.len())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.ledger.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn record_divergence(&self) -> u64 {
        self.divergence_skips.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub async fn stats(&self) -> StoreStats {
        let inner = self.inner.read().await;
        StoreStats {
            total_chunks: inner.ledger.len(),
            dimension: inner.index.dimension(),
            distinct_urls: inner.ledger.distinct_urls(),
            divergence_skips: self.divergence_skips.load(Ordering::Relaxed),
        }
    }

    /// Pushes index rows with no ledger entries, simulating a broken append.
    #[cfg(test)]
    pub(crate) async fn force_index_only(&self, embeddings: Vec<Embedding>) {
        let mut inner = self.inner.write().await;
        inner
            .index
            .add(&embeddings)
            .expect("test embeddings match the store dimension");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_keeps_index_and_ledger_aligned() {
        let store = VectorStore::new(2);

        let total = store
            .append(
                vec![Chunk::new("a", "x", "u1"), Chunk::new("b", "y", "u2")],
                vec![vec![0.0, 1.0], vec![1.0, 0.0]],
            )
            .await
            .unwrap();

        assert_eq!(total, 2);
        let snapshot = store.read().await;
        assert_eq!(snapshot.index().len(), snapshot.ledger().len());
        let hit = snapshot.index().search(&[1.0, 0.0], 1).unwrap()[0];
        assert_eq!(snapshot.ledger().get(hit.position).unwrap().id, "b");
    }

    #[tokio::test]
    async fn rejected_batch_changes_nothing() {
        let store = VectorStore::new(2);

        let mismatch = store
            .append(vec![Chunk::new("a", "x", "u1")], vec![])
            .await;
        let bad_dim = store
            .append(vec![Chunk::new("a", "x", "u1")], vec![vec![1.0]])
            .await;

        assert!(mismatch.is_err());
        assert!(matches!(bad_dim, Err(ApiError::DimensionMismatch { .. })));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_appends_stay_aligned() {
        let store = VectorStore::new(1);

        let mut handles = Vec::new();
        for worker in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    let value = (worker * 100 + i) as f32;
                    let id = format!("{}-{}", worker, i);
                    store
                        .append(vec![Chunk::new(id, value.to_string(), "u")], vec![vec![value]])
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let snapshot = store.read().await;
        assert_eq!(snapshot.len(), 200);
        assert_eq!(snapshot.ledger().len(), 200);
        // Every row's vector must be the value its ledger text was built from.
        for hit in snapshot.index().search(&[0.0], 200).unwrap() {
            let chunk = snapshot.ledger().get(hit.position).unwrap();
            let value: f32 = chunk.text.parse().unwrap();
            assert_eq!(hit.distance, value * value);
        }
    }

    #[tokio::test]
    async fn stats_report_counts() {
        let store = VectorStore::new(1);
        store
            .append(
                vec![Chunk::new("a", "x", "u1"), Chunk::new("b", "y", "u1")],
                vec![vec![0.0], vec![1.0]],
            )
            .await
            .unwrap();
        store.record_divergence();

        let stats = store.stats().await;
        assert_eq!(stats.total_chunks, 2);
        assert_eq!(stats.distinct_urls, 1);
        assert_eq!(stats.divergence_skips, 1);
        assert_eq!(stats.dimension, 1);
    }
}
