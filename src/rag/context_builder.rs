//! Context builder.
//!
//! Turns retrieved chunks into the context block of a generation prompt:
//! nearest chunks first, one paragraph each, bounded by a character budget.

use serde::{Deserialize, Serialize};

use super::types::RetrievedChunk;

/// Configuration for context building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextBuilderConfig {
    /// Maximum total context length in characters
    pub max_context_chars: usize,
    /// Whether to prefix each block with its section label
    pub include_sections: bool,
}

impl Default for ContextBuilderConfig {
    fn default() -> Self {
        Self {
            max_context_chars: 12_000,
            include_sections: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContextBuilder {
    config: ContextBuilderConfig,
}

impl ContextBuilder {
    pub fn new(config: ContextBuilderConfig) -> Self {
        Self { config }
    }

    /// Joins chunk texts with blank lines, stopping before the budget is
    /// exceeded. The first block is always kept, cut short if it alone is
    /// over budget.
    ///
    /// Returns the context and the number of blocks it carries.
    pub fn build(&self, chunks: &[RetrievedChunk]) -> (String, usize) {
        let budget = self.config.max_context_chars;
        let mut context = String::new();
        let mut used = 0;
        let mut blocks = 0;

        for hit in chunks {
            let block = self.format_block(hit);
            let block_len = block.chars().count();

            if context.is_empty() {
                if block_len > budget {
                    return (block.chars().take(budget).collect(), 1);
                }
                context.push_str(&block);
                used = block_len;
                blocks = 1;
                continue;
            }

            // two chars for the "\n\n" separator
            if used + 2 + block_len > budget {
                break;
            }
            context.push_str("\n\n");
            context.push_str(&block);
            used += 2 + block_len;
            blocks += 1;
        }

        (context, blocks)
    }

    fn format_block(&self, hit: &RetrievedChunk) -> String {
        let text = hit.chunk.text.trim();
        let section = hit.chunk.section.trim();
        if self.config.include_sections && !section.is_empty() {
            format!("[{}]\n{}", section, text)
        } else {
            text.to_string()
        }
    }
}
