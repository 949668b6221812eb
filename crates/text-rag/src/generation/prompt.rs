//! Prompt assembly for grounded answer generation

use crate::types::ScoredChunk;

/// Builds grounded prompts from retrieved chunks
pub struct PromptBuilder;

impl PromptBuilder {
    /// Format retrieved chunks as a numbered context block
    pub fn build_context(chunks: &[ScoredChunk]) -> String {
        let mut context = String::new();
        for (i, scored) in chunks.iter().enumerate() {
            context.push_str(&format!(
                "[{}] {}\n\nContent:\n{}\n\n---\n\n",
                i + 1,
                scored.chunk.source,
                scored.chunk.content
            ));
        }
        context
    }

    /// Build the full prompt: grounding rules, context, sources, question
    pub fn build_prompt(question: &str, chunks: &[ScoredChunk]) -> String {
        let context = Self::build_context(chunks);

        let mut sources = String::new();
        for (i, scored) in chunks.iter().enumerate() {
            sources.push_str(&format!("[{}] {}\n", i + 1, scored.chunk.source));
        }

        format!(
            "You are a helpful assistant that answers questions using the provided document excerpts.\n\n\
             RULES:\n\
             1. Answer using only information found in the context below.\n\
             2. If the context does not contain enough information, say so instead of guessing.\n\
             3. Cite the documents you rely on inline, using the format [Source: name].\n\
             4. Keep the answer concise.\n\n\
             CONTEXT FROM DOCUMENTS:\n{}\n\
             AVAILABLE SOURCES:\n{}\n\
             QUESTION: {}\n\n\
             ANSWER:",
            context, sources, question
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, Document};

    fn scored_chunks() -> Vec<ScoredChunk> {
        let doc_a = Document::new("a.txt", "text", "h1");
        let doc_b = Document::new("b.txt", "text", "h2");
        vec![
            ScoredChunk {
                chunk: Chunk::new(&doc_a, "First excerpt.", 0, 14, 0),
                score: 0.9,
            },
            ScoredChunk {
                chunk: Chunk::new(&doc_b, "Second excerpt.", 0, 15, 0),
                score: 0.8,
            },
        ]
    }

    #[test]
    fn test_context_numbers_chunks_in_order() {
        let context = PromptBuilder::build_context(&scored_chunks());
        assert!(context.contains("[1] a.txt"));
        assert!(context.contains("[2] b.txt"));
        assert!(context.contains("First excerpt."));
        assert!(context.contains("Second excerpt."));
        let first = context.find("[1]").unwrap();
        let second = context.find("[2]").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_prompt_contains_question_and_sources() {
        let prompt = PromptBuilder::build_prompt("What is in the excerpts?", &scored_chunks());
        assert!(prompt.contains("QUESTION: What is in the excerpts?"));
        assert!(prompt.contains("[1] a.txt"));
        assert!(prompt.contains("[2] b.txt"));
        assert!(prompt.contains("[Source: name]"));
        assert!(prompt.ends_with("ANSWER:"));
    }

    #[test]
    fn test_prompt_with_no_chunks_still_includes_question() {
        let prompt = PromptBuilder::build_prompt("Anything?", &[]);
        assert!(prompt.contains("QUESTION: Anything?"));
    }
}
