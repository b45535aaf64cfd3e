use std::collections::HashSet;

use super::types::Chunk;
use crate::core::errors::ApiError;

/// Chunk records in ingestion order; entry `i` describes index row `i`.
#[derive(Debug, Clone, Default)]
pub struct MetadataLedger {
    records: Vec<Chunk>,
}

impl MetadataLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn append(&mut self, records: Vec<Chunk>) {
        self.records.extend(records);
    }

    pub fn get(&self, position: usize) -> Result<&Chunk, ApiError> {
        self.records.get(position).ok_or(ApiError::OutOfRange {
            position,
            len: self.records.len(),
        })
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.records.iter().any(|chunk| chunk.url == url)
    }

    pub fn url_count(&self, url: &str) -> usize {
        self.records.iter().filter(|chunk| chunk.url == url).count()
    }

    pub fn distinct_urls(&self) -> usize {
        self.records
            .iter()
            .map(|chunk| chunk.url.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> MetadataLedger {
        let mut ledger = MetadataLedger::new();
        ledger.append(vec![
            Chunk::new("a", "cats are mammals", "u1"),
            Chunk::new("b", "dogs are mammals", "u1"),
            Chunk::new("c", "rockets use fuel", "u2"),
        ]);
        ledger
    }

    #[test]
    fn get_preserves_append_order() {
        let ledger = ledger();
        assert_eq!(ledger.get(0).unwrap().id, "a");
        assert_eq!(ledger.get(2).unwrap().id, "c");
    }

    #[test]
    fn get_past_end_is_out_of_range() {
        let err = ledger().get(3).unwrap_err();
        assert!(matches!(err, ApiError::OutOfRange { position: 3, len: 3 }));
    }

    #[test]
    fn url_lookups() {
        let ledger = ledger();
        assert!(ledger.contains_url("u2"));
        assert!(!ledger.contains_url("u3"));
        assert_eq!(ledger.url_count("u1"), 2);
        assert_eq!(ledger.distinct_urls(), 2);
    }
}
