//! Response types for the ask endpoint

use crate::types::document::Chunk;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum snippet length in characters
const SNIPPET_MAX_CHARS: usize = 250;

/// Reply produced when a question is empty or whitespace-only
pub const EMPTY_QUESTION_REPLY: &str = "Ask a question above.";

/// A citation pointing back to a retrieved chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// ID of the cited chunk
    pub chunk_id: Uuid,
    /// ID of the chunk's parent document
    pub document_id: Uuid,
    /// Source of the parent document
    pub source: String,
    /// Short excerpt of the cited chunk
    pub snippet: String,
    /// Similarity score of the chunk for the query
    pub similarity_score: f32,
}

impl Citation {
    /// Build a citation from a retrieved chunk
    pub fn from_chunk(chunk: &Chunk, similarity_score: f32) -> Self {
        Self {
            chunk_id: chunk.id,
            document_id: chunk.document_id,
            source: chunk.source.clone(),
            snippet: excerpt(&chunk.content),
            similarity_score,
        }
    }

    /// Render the citation in the inline format used by prompts
    pub fn format_inline(&self) -> String {
        format!("[Source: {}]", self.source)
    }
}

/// A chunk paired with its similarity score for a query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Cosine similarity against the query vector
    pub score: f32,
}

/// Outcome of asking a question through the pipeline
#[derive(Debug, Clone)]
pub struct AnswerResult {
    /// Generated answer text
    pub answer: String,
    /// Citations for the chunks the answer was grounded on
    pub citations: Vec<Citation>,
    /// The retrieved chunks, in relevance order
    pub chunks: Vec<ScoredChunk>,
    /// Whether the question was empty and the pipeline was skipped
    pub empty_question: bool,
}

impl AnswerResult {
    /// The fixed reply produced for an empty or whitespace-only question
    pub fn empty_question() -> Self {
        Self {
            answer: EMPTY_QUESTION_REPLY.to_string(),
            citations: Vec::new(),
            chunks: Vec::new(),
            empty_question: true,
        }
    }

    /// Render the metadata block: a sources line, optionally followed by
    /// numbered snippets of the retrieved chunks. The fixed reply to an
    /// empty question carries no metadata.
    pub fn render_meta(&self, show_snippets: bool) -> String {
        if self.empty_question {
            return String::new();
        }

        let mut sources: Vec<&str> = Vec::new();
        for citation in &self.citations {
            if !sources.contains(&citation.source.as_str()) {
                sources.push(&citation.source);
            }
        }

        let sources_line = if sources.is_empty() {
            "Sources: None".to_string()
        } else {
            format!("Sources: {}", sources.join(", "))
        };

        if !show_snippets || self.chunks.is_empty() {
            return sources_line;
        }

        let mut meta = sources_line;
        meta.push_str("\nSnippets:");
        for (i, scored) in self.chunks.iter().enumerate() {
            meta.push_str(&format!("\n{}. {}", i + 1, excerpt(&scored.chunk.content)));
        }
        meta
    }
}

/// Truncate text to the snippet limit, collapsing newlines into spaces
fn excerpt(text: &str) -> String {
    let truncated: String = text.chars().take(SNIPPET_MAX_CHARS).collect();
    truncated
        .trim()
        .replace(['\n', '\r'], " ")
}

/// HTTP response for the ask endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    /// Generated answer text
    pub answer: String,
    /// Metadata block: sources line plus optional snippets
    pub meta: String,
    /// Number of chunks retrieved for this answer
    pub chunks_retrieved: usize,
    /// End-to-end processing time
    pub processing_time_ms: u64,
}
