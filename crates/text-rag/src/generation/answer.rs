//! Grounded answer generation

use crate::error::Result;
use crate::generation::prompt::PromptBuilder;
use crate::providers::LlmProvider;
use crate::types::{Citation, ScoredChunk};
use std::sync::Arc;

/// Generates answers for questions over retrieved chunks
pub struct AnswerGenerator {
    llm: Arc<dyn LlmProvider>,
}

impl AnswerGenerator {
    /// Create a generator backed by an LLM provider
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Generate an answer grounded in the retrieved chunks.
    ///
    /// Returns the answer text plus one citation per chunk that was
    /// passed to the model, in retrieval order.
    pub async fn generate(
        &self,
        question: &str,
        chunks: &[ScoredChunk],
        temperature: f32,
    ) -> Result<(String, Vec<Citation>)> {
        let prompt = PromptBuilder::build_prompt(question, chunks);
        let answer = self.llm.generate(&prompt, temperature).await?;

        let citations = chunks
            .iter()
            .map(|scored| Citation::from_chunk(&scored.chunk, scored.score))
            .collect();

        Ok((answer, citations))
    }
}
