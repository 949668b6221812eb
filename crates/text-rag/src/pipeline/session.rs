//! Question-answering sessions

use crate::error::Result;
use crate::generation::AnswerGenerator;
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::retrieval::Retriever;
use crate::storage::VectorIndex;
use crate::types::AnswerResult;
use std::sync::Arc;

/// A question-answering session over a built index.
///
/// Sessions are cheap value objects: retrieval depth and temperature
/// are fixed at construction, and a fresh session is assembled for
/// each request.
pub struct Session {
    retriever: Retriever,
    generator: AnswerGenerator,
    k: usize,
    temperature: f32,
}

impl Session {
    /// Assemble a session from an index and providers.
    ///
    /// Fails if the embedder does not match the one the index was
    /// built with.
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        k: usize,
        temperature: f32,
    ) -> Result<Self> {
        Ok(Self {
            retriever: Retriever::new(index, embedder)?,
            generator: AnswerGenerator::new(llm),
            k,
            temperature,
        })
    }

    /// Number of chunks retrieved per question
    pub fn k(&self) -> usize {
        self.k
    }

    /// Sampling temperature used for answers
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Answer a question.
    ///
    /// An empty or whitespace-only question short-circuits to a fixed
    /// reply without calling the embedder or the LLM.
    pub async fn ask(&self, question: &str) -> Result<AnswerResult> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(AnswerResult::empty_question());
        }

        let chunks = self.retriever.retrieve(question, self.k).await?;
        let (answer, citations) = self
            .generator
            .generate(question, &chunks, self.temperature)
            .await?;

        Ok(AnswerResult {
            answer,
            citations,
            chunks,
            empty_question: false,
        })
    }
}
