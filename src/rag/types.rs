use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::errors::ApiError;

/// A unit of ingestible text, scoped to one source document by `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Caller-supplied identifier; a fresh UUID when omitted.
    #[serde(default = "new_chunk_id")]
    pub id: String,
    pub text: String,
    /// Logical grouping label, usually the nearest heading.
    #[serde(default)]
    pub section: String,
    /// Locator back into the source page (e.g. a CSS selector or anchor).
    #[serde(default)]
    pub selector: Option<String>,
    /// Scope key: the document this chunk belongs to.
    pub url: String,
}

impl Chunk {
    pub fn new(id: impl Into<String>, text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            section: String::new(),
            selector: None,
            url: url.into(),
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = section.into();
        self
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.text.trim().is_empty() {
            return Err(ApiError::Validation(format!(
                "chunk '{}' has empty text",
                self.id
            )));
        }
        if self.url.trim().is_empty() {
            return Err(ApiError::Validation(format!(
                "chunk '{}' has empty url",
                self.id
            )));
        }
        Ok(())
    }
}

fn new_chunk_id() -> String {
    Uuid::new_v4().to_string()
}

/// One accepted search hit.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedChunk {
    #[serde(flatten)]
    pub chunk: Chunk,
    /// Squared L2 distance to the query embedding.
    pub distance: f32,
    /// Position in the store (ingestion order).
    pub position: usize,
}

/// Outcome of a retrieval query.
///
/// `Empty` and `NoMatch` are ordinary results, not errors: the first means
/// nothing was ever ingested, the second that nothing passed the scope filter.
#[derive(Debug, Clone)]
pub enum Retrieval {
    Empty,
    NoMatch,
    Found(Vec<RetrievedChunk>),
}

impl Retrieval {
    pub fn chunks(&self) -> &[RetrievedChunk] {
        match self {
            Retrieval::Found(chunks) => chunks,
            Retrieval::Empty | Retrieval::NoMatch => &[],
        }
    }

    pub fn used_count(&self) -> usize {
        self.chunks().len()
    }

    pub fn status(&self) -> &'static str {
        match self {
            Retrieval::Empty => "empty",
            Retrieval::NoMatch => "no_match",
            Retrieval::Found(_) => "ok",
        }
    }
}

/// Result of an ingestion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub accepted: usize,
    pub total: usize,
}
