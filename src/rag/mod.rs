//! Retrieval core.
//!
//! - `VectorStore`: vector index and metadata ledger kept aligned under one lock
//! - `RetrievalEngine`: ingestion plus over-fetch, scope filter and truncation
//! - `Summarizer`: retrieval feeding a grounded generation prompt

pub mod context_builder;
pub mod engine;
pub mod index;
pub mod ledger;
pub mod store;
pub mod summarizer;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use context_builder::{ContextBuilder, ContextBuilderConfig};
pub use engine::{RetrievalConfig, RetrievalEngine};
pub use store::{StoreStats, VectorStore};
pub use summarizer::{Summarizer, Summary};
pub use types::{Chunk, IngestReport, Retrieval, RetrievedChunk};
