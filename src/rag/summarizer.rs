//! Retrieval followed by grounded generation.

use serde::Serialize;

use super::context_builder::ContextBuilder;
use super::engine::RetrievalEngine;
use super::types::Retrieval;
use crate::core::errors::ApiError;
use crate::llm::GenerationGateway;

pub const EMPTY_STORE_MESSAGE: &str = "No data embedded yet.";
pub const NO_MATCH_MESSAGE: &str = "No relevant content found.";

const INSTRUCTIONS: &str = "You are summarizing an article.

STRICT RULES:
- Use ONLY the provided context
- Do NOT add external knowledge
- Be faithful to the author

Before finalizing, check that you have covered:
- Problem
- Main claim
- Key idea or method
- Why it works
- Results and impact
- The author's conclusion

Then produce a structured bullet-point summary covering all of these.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub summary: String,
    pub chunks_used: usize,
}

#[derive(Clone)]
pub struct Summarizer {
    engine: RetrievalEngine,
    generator: GenerationGateway,
    context: ContextBuilder,
}

impl Summarizer {
    pub fn new(engine: RetrievalEngine, generator: GenerationGateway, context: ContextBuilder) -> Self {
        Self {
            engine,
            generator,
            context,
        }
    }

    pub fn generator(&self) -> &GenerationGateway {
        &self.generator
    }

    pub async fn summarize(
        &self,
        query: &str,
        url: Option<&str>,
        top_k: usize,
    ) -> Result<Summary, ApiError> {
        let retrieval = self.engine.query(query, url, top_k).await?;
        let chunks = match &retrieval {
            Retrieval::Empty => return Ok(Summary::canned(EMPTY_STORE_MESSAGE)),
            Retrieval::NoMatch => return Ok(Summary::canned(NO_MATCH_MESSAGE)),
            Retrieval::Found(chunks) => chunks,
        };

        // the budget may leave trailing hits out of the prompt
        let (context, chunks_used) = self.context.build(chunks);
        let prompt = build_prompt(&context, query);
        let summary = self.generator.generate(&prompt).await?;

        Ok(Summary {
            summary,
            chunks_used,
        })
    }
}

impl Summary {
    fn canned(message: &str) -> Self {
        Self {
            summary: message.to_string(),
            chunks_used: 0,
        }
    }
}

pub fn build_prompt(context: &str, task: &str) -> String {
    format!(
        "{}\n\nContext:\n{}\n\nTask:\n{}\n",
        INSTRUCTIONS,
        context,
        task.trim()
    )
}
